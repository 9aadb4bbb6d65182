use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentity::{Client as CognitoClient, error::DisplayErrorContext};
use aws_smithy_types::DateTime;
use chrono::{DateTime as ChronoDateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

use super::Credentials;
use crate::{
    actions::{SecretMasker, oidc::IdTokenProvider},
    config::AuthConfig,
    constants::{AUDIENCE, IDENTITY_PROVIDER},
};

/// Identity provider name -> token, sent with both Cognito calls
pub type Logins = HashMap<String, String>;

/// Raw credentials as returned by GetCredentialsForIdentity
#[derive(Clone, Default)]
pub struct FederatedCredentials {
    pub access_key_id: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub expiration: Option<DateTime>,
}

/// The two Cognito Identity operations used by the exchange
#[async_trait]
pub trait IdentityFederation: Send + Sync {
    async fn get_id(
        &self,
        pool_id: &str,
        account_id: &str,
        logins: &Logins,
    ) -> Result<Option<String>>;

    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: &Logins,
    ) -> Result<Option<FederatedCredentials>>;
}

/// Cognito Identity client. Both operations are unauthenticated, so the
/// client is built without a credentials provider.
#[derive(Debug, Clone)]
pub struct CognitoFederation {
    client: CognitoClient,
}

impl CognitoFederation {
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .no_credentials()
            .load()
            .await;

        Self {
            client: CognitoClient::new(&config),
        }
    }
}

#[async_trait]
impl IdentityFederation for CognitoFederation {
    async fn get_id(
        &self,
        pool_id: &str,
        account_id: &str,
        logins: &Logins,
    ) -> Result<Option<String>> {
        let response = self
            .client
            .get_id()
            .identity_pool_id(pool_id)
            .account_id(account_id)
            .set_logins(Some(logins.clone()))
            .send()
            .await
            .map_err(|e| anyhow!("Cognito GetId failed: {}", DisplayErrorContext(&e)))?;

        Ok(response.identity_id().map(str::to_string))
    }

    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: &Logins,
    ) -> Result<Option<FederatedCredentials>> {
        let response = self
            .client
            .get_credentials_for_identity()
            .identity_id(identity_id)
            .set_logins(Some(logins.clone()))
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "Cognito GetCredentialsForIdentity failed: {}",
                    DisplayErrorContext(&e)
                )
            })?;

        Ok(response.credentials().map(|creds| FederatedCredentials {
            access_key_id: creds.access_key_id().map(str::to_string),
            secret_key: creds.secret_key().map(str::to_string),
            session_token: creds.session_token().map(str::to_string),
            expiration: creds.expiration().copied(),
        }))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Format an expiration the way JavaScript's `toISOString` does
fn to_iso8601(value: &DateTime) -> Result<String> {
    let datetime = ChronoDateTime::<Utc>::from_timestamp(value.secs(), value.subsec_nanos())
        .context("Credential expiration is out of range")?;

    Ok(datetime.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Exchange a GitHub OIDC token for temporary AWS credentials through a
/// Cognito Identity Pool.
///
/// Every secret is registered with `masker` as soon as it is received: the
/// OIDC token before the first Cognito call, the three credential fields
/// before they are validated. No retries.
pub async fn get_cognito_credentials<T, F, M>(
    config: &AuthConfig,
    tokens: &T,
    federation: &F,
    masker: &mut M,
) -> Result<Credentials>
where
    T: IdTokenProvider + ?Sized,
    F: IdentityFederation + ?Sized,
    M: SecretMasker + ?Sized,
{
    info!("Requesting GitHub OIDC token...");
    let oidc_token = tokens.id_token(AUDIENCE).await?;
    masker.set_secret(&oidc_token);

    let logins = Logins::from([(IDENTITY_PROVIDER.to_string(), oidc_token)]);

    info!("Exchanging OIDC token for Cognito identity...");
    debug!("Identity pool: {}", config.pool_id);
    debug!("Account: {}", config.account_id);
    debug!("Region: {}", config.region);

    let identity_id = federation
        .get_id(&config.pool_id, &config.account_id, &logins)
        .await?
        .filter(|id| !id.is_empty())
        .context("Failed to obtain Identity ID from Cognito Identity Pool")?;
    debug!("Identity ID: {}", identity_id);

    info!("Obtaining AWS credentials from Cognito...");
    let federated = federation
        .get_credentials_for_identity(&identity_id, &logins)
        .await?
        .unwrap_or_default();

    let access_key_id = present(federated.access_key_id);
    let secret_key = present(federated.secret_key);
    let session_token = present(federated.session_token);

    for secret in [&access_key_id, &secret_key, &session_token]
        .into_iter()
        .flatten()
    {
        masker.set_secret(secret);
    }

    let (Some(access_key_id), Some(secret_access_key), Some(session_token)) =
        (access_key_id, secret_key, session_token)
    else {
        bail!("Failed to obtain AWS credentials from Cognito");
    };

    let expiration = federated
        .expiration
        .as_ref()
        .map(to_iso8601)
        .transpose()?
        .unwrap_or_default();

    info!("Successfully obtained AWS credentials");
    Ok(Credentials {
        access_key_id,
        secret_access_key,
        session_token,
        expiration,
    })
}
