use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use std::env;
use tracing::debug;
use urlencoding;

/// Environment variable holding the OIDC token endpoint
pub const ACTIONS_ID_TOKEN_REQUEST_URL: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";

/// Environment variable holding the bearer token for the OIDC endpoint
pub const ACTIONS_ID_TOKEN_REQUEST_TOKEN: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";

/// Source of workload identity tokens
#[async_trait]
pub trait IdTokenProvider: Send + Sync {
    /// Request a JWT scoped to `audience`
    async fn id_token(&self, audience: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    value: Option<String>,
}

/// Fetches OIDC tokens from the GitHub Actions token service.
/// Requires `permissions: id-token: write` on the job; the request URL and
/// bearer token are read when a token is requested.
#[derive(Debug, Clone, Default)]
pub struct GithubIdTokenProvider {
    client: ReqwestClient,
}

impl GithubIdTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn request_params() -> Result<(String, String)> {
        let request_url = env::var(ACTIONS_ID_TOKEN_REQUEST_URL).with_context(|| {
            format!("Unable to get {ACTIONS_ID_TOKEN_REQUEST_URL} env variable")
        })?;
        let request_token = env::var(ACTIONS_ID_TOKEN_REQUEST_TOKEN).with_context(|| {
            format!("Unable to get {ACTIONS_ID_TOKEN_REQUEST_TOKEN} env variable")
        })?;

        Ok((request_url, request_token))
    }
}

fn token_url(request_url: &str, audience: &str) -> String {
    // The runner hands out a URL that already carries a query string
    let separator = if request_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}audience={}",
        request_url,
        separator,
        urlencoding::encode(audience)
    )
}

#[async_trait]
impl IdTokenProvider for GithubIdTokenProvider {
    async fn id_token(&self, audience: &str) -> Result<String> {
        debug!("Requesting OIDC token for audience {}", audience);
        let (request_url, request_token) = Self::request_params()?;

        let response = self
            .client
            .get(token_url(&request_url, audience))
            .bearer_auth(&request_token)
            .header("Accept", "application/json")
            .header("User-Agent", "actions/oidc-client")
            .send()
            .await
            .context("Failed to request OIDC token")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to get ID Token. Error Code: {}", status.as_u16());
        }

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse OIDC token response")?;

        body.value
            .filter(|token| !token.is_empty())
            .context("Response json body do not have ID Token field")
    }
}
