use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

use super::Credentials;
use crate::constants::{CREDENTIALS_FILE_NAME, PRIVATE_DIR_MODE, PRIVATE_FILE_MODE};

/// On-disk form of [`Credentials`]. Field names are PascalCase because
/// that is what the consuming tools expect.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsFile {
    #[serde(default)]
    access_key_id: Option<String>,
    #[serde(default)]
    secret_access_key: Option<String>,
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    expiration: Option<String>,
}

impl From<&Credentials> for CredentialsFile {
    fn from(creds: &Credentials) -> Self {
        Self {
            access_key_id: Some(creds.access_key_id.clone()),
            secret_access_key: Some(creds.secret_access_key.clone()),
            session_token: Some(creds.session_token.clone()),
            expiration: Some(creds.expiration.clone()),
        }
    }
}

impl From<CredentialsFile> for Credentials {
    fn from(file: CredentialsFile) -> Self {
        Self {
            access_key_id: file.access_key_id.unwrap_or_default(),
            secret_access_key: file.secret_access_key.unwrap_or_default(),
            session_token: file.session_token.unwrap_or_default(),
            expiration: file.expiration.unwrap_or_default(),
        }
    }
}

/// Create `dir` (and parents) restricted to the owner
pub async fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(PRIVATE_DIR_MODE);

    builder
        .create(dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // An existing directory keeps its old mode unless it is reset
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, std::fs::Permissions::from_mode(PRIVATE_DIR_MODE))
            .await
            .with_context(|| format!("Failed to restrict permissions on {}", dir.display()))?;
    }

    Ok(())
}

/// Write `contents` to `path`, readable and writable by the owner only
pub async fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(PRIVATE_FILE_MODE);

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(PRIVATE_FILE_MODE))
            .await
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }

    file.write_all(contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.flush().await?;

    Ok(())
}

/// Persist credentials as JSON inside `dir`, returning the absolute file path
pub async fn save_credentials(dir: &Path, creds: &Credentials) -> Result<PathBuf> {
    create_private_dir(dir).await?;

    let dir = fs::canonicalize(dir)
        .await
        .with_context(|| format!("Failed to resolve directory: {}", dir.display()))?;
    let path = dir.join(CREDENTIALS_FILE_NAME);

    let json = serde_json::to_vec(&CredentialsFile::from(creds))
        .context("Failed to serialize credentials")?;
    write_private_file(&path, &json)
        .await
        .context("Failed to write credentials file")?;

    Ok(path)
}

/// Load credentials persisted by [`save_credentials`].
/// Missing or null fields come back empty; completeness is the caller's call.
pub async fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;

    let file: CredentialsFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse credentials file: {}", path.display()))?;

    Ok(file.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            access_key_id: "AKIA_TEST".to_string(),
            secret_access_key: "secret/with+chars".to_string(),
            session_token: "token_test".to_string(),
            expiration: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_then_load_returns_same_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let creds_dir = dir.path().join(".gh-action-cache-12345");

        let path = save_credentials(&creds_dir, &sample()).await.unwrap();
        let loaded = load_credentials(&path).await.unwrap();

        assert_eq!(loaded, sample());
        assert!(path.is_absolute());
        assert!(path.ends_with("credentials.json"));
    }

    #[tokio::test]
    async fn test_saved_file_uses_pascal_case() {
        let dir = tempfile::tempdir().unwrap();

        let path = save_credentials(dir.path(), &sample()).await.unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["AccessKeyId"], "AKIA_TEST");
        assert_eq!(value["SecretAccessKey"], "secret/with+chars");
        assert_eq!(value["SessionToken"], "token_test");
        assert_eq!(value["Expiration"], "2026-01-01T00:00:00.000Z");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let creds_dir = dir.path().join("creds");

        let path = save_credentials(&creds_dir, &sample()).await.unwrap();

        let dir_mode = std::fs::metadata(&creds_dir).unwrap().permissions().mode();
        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();

        save_credentials(dir.path(), &sample()).await.unwrap();
        let mut updated = sample();
        updated.session_token = "t2".to_string();
        let path = save_credentials(dir.path(), &updated).await.unwrap();

        assert_eq!(load_credentials(&path).await.unwrap().session_token, "t2");
    }

    #[tokio::test]
    async fn test_load_tolerates_missing_and_null_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"AccessKeyId":"A","SecretAccessKey":null}"#).unwrap();

        let loaded = load_credentials(&path).await.unwrap();

        assert_eq!(loaded.access_key_id, "A");
        assert_eq!(loaded.secret_access_key, "");
        assert_eq!(loaded.session_token, "");
        assert_eq!(loaded.expiration, "");
        assert!(!loaded.is_complete());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_credentials(Path::new("/nonexistent/credentials.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read credentials file"));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_credentials(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse credentials file"));
    }
}
