use anyhow::Result;
use clap::Args;
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::info;

use crate::{
    actions::{Annotations, GithubRunner, Inputs, Outputs, SecretMasker, oidc},
    aws::{
        cognito::{self, CognitoFederation, IdentityFederation},
        credentials,
    },
    config::PoolTable,
    constants::{
        self, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN, CREDENTIALS_FILE_KEY,
        DEFAULT_ENVIRONMENT, ENVIRONMENT_INPUT,
    },
};

#[derive(Debug, Clone, Args)]
pub struct SetupCommand {
    #[arg(
        long,
        env = "CREDENTIAL_GUARD_DIR",
        help = "Directory for the persisted credentials (default: <tmp>/.gh-action-cache-<run id>)"
    )]
    pub credentials_dir: Option<PathBuf>,
}

impl SetupCommand {
    pub async fn execute(self) -> ExitCode {
        let credentials_dir = self
            .credentials_dir
            .unwrap_or_else(constants::default_credentials_dir);
        let pools = PoolTable::default();
        let tokens = oidc::GithubIdTokenProvider::new();
        let federation = CognitoFederation::new(pools.region()).await;
        let mut runner = GithubRunner::new();

        run(&mut runner, &pools, &tokens, &federation, &credentials_dir).await;

        super::exit_code(&runner)
    }
}

/// Acquire credentials and hand them to later steps: the persisted file for
/// the guard, step outputs for steps in the same job.
/// Outputs are published only once everything else has succeeded.
pub async fn acquire<R, T, F>(
    runner: &mut R,
    pools: &PoolTable,
    tokens: &T,
    federation: &F,
    credentials_dir: &Path,
) -> Result<PathBuf>
where
    R: Inputs + Outputs + SecretMasker,
    T: oidc::IdTokenProvider + ?Sized,
    F: IdentityFederation + ?Sized,
{
    let environment = runner
        .input(ENVIRONMENT_INPUT)
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
    let auth_config = pools.resolve(&environment)?;
    info!("Using {} identity pool", environment);

    let creds = cognito::get_cognito_credentials(&auth_config, tokens, federation, runner).await?;

    let credentials_file = credentials::save_credentials(credentials_dir, &creds).await?;
    info!("Credentials written to {}", credentials_file.display());

    let file_output = credentials_file.to_string_lossy();
    runner.set_outputs(&[
        (CREDENTIALS_FILE_KEY, file_output.as_ref()),
        (AWS_ACCESS_KEY_ID, creds.access_key_id.as_str()),
        (AWS_SECRET_ACCESS_KEY, creds.secret_access_key.as_str()),
        (AWS_SESSION_TOKEN, creds.session_token.as_str()),
    ])?;

    info!("AWS credentials configured successfully");
    Ok(credentials_file)
}

/// Run the acquisition phase, reporting any error as a step failure
pub async fn run<R, T, F>(
    runner: &mut R,
    pools: &PoolTable,
    tokens: &T,
    federation: &F,
    credentials_dir: &Path,
) where
    R: Inputs + Outputs + SecretMasker + Annotations,
    T: oidc::IdTokenProvider + ?Sized,
    F: IdentityFederation + ?Sized,
{
    if let Err(e) = acquire(runner, pools, tokens, federation, credentials_dir).await {
        runner.set_failed(&format!("Credential setup failed: {e:#}"));
    }
}
