use std::fmt;

pub mod cognito;
pub mod credentials;
pub mod profile;

/// AWS temporary credentials structure
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// ISO-8601 timestamp, empty when unknown
    pub expiration: String,
}

impl Credentials {
    /// Only complete credentials may be exported or written to a profile
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.session_token.is_empty()
    }

    /// The three secret fields, in export order
    pub fn secrets(&self) -> [&str; 3] {
        [
            self.access_key_id.as_str(),
            self.secret_access_key.as_str(),
            self.session_token.as_str(),
        ]
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "***" }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &redact(&self.access_key_id))
            .field("secret_access_key", &redact(&self.secret_access_key))
            .field("session_token", &redact(&self.session_token))
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "secret123".to_string(),
            session_token: "token456".to_string(),
            expiration: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_complete_credentials() {
        assert!(sample().is_complete());
    }

    #[test]
    fn test_incomplete_credentials() {
        let mut creds = sample();
        creds.secret_access_key.clear();
        assert!(!creds.is_complete());

        let mut creds = sample();
        creds.session_token.clear();
        assert!(!creds.is_complete());

        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn test_expiration_is_optional() {
        let mut creds = sample();
        creds.expiration.clear();
        assert!(creds.is_complete());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let output = format!("{:?}", sample());

        assert!(!output.contains("AKIATEST"));
        assert!(!output.contains("secret123"));
        assert!(!output.contains("token456"));
        assert!(output.contains("2026-01-01T00:00:00.000Z"));
    }
}
