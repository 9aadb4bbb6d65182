use clap::Args;
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{debug, info};

use crate::{
    actions::{Annotations, Environment, GithubRunner, RunState, SecretMasker},
    aws::{Credentials, credentials, profile},
    constants::{
        self, AWS_ACCESS_KEY_ID, AWS_DEFAULT_PROFILE_VAR, AWS_DEFAULT_REGION_VAR,
        AWS_PROFILE_VAR, AWS_REGION, AWS_REGION_VAR, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN,
        CREDENTIALS_FILE_KEY,
    },
};

#[derive(Debug, Clone, Args)]
pub struct RestoreCommand {
    #[arg(
        long,
        help = "Directory for the fallback AWS profile files (default: ~/.aws)"
    )]
    pub aws_dir: Option<PathBuf>,
}

impl RestoreCommand {
    pub async fn execute(self) -> ExitCode {
        let aws_dir = self.aws_dir.or_else(constants::default_aws_dir);
        let mut runner = GithubRunner::new();

        run(&mut runner, AWS_REGION, aws_dir.as_deref()).await;

        // Restore is best-effort and must never fail the job
        ExitCode::SUCCESS
    }
}

/// Result of the fallback profile write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackStatus {
    Written(PathBuf),
    Failed(String),
}

/// Every way a restore can end. Only `Restored` touched the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The guard never recorded a credentials file
    NoState,
    /// The file could not be read or parsed, or exporting failed
    Failed(String),
    /// The file lacks one of the three secret fields
    Incomplete,
    Restored { fallback: FallbackStatus },
}

/// Re-export persisted credentials for the rest of the job.
///
/// Environment credentials are made to win over profile files by clearing
/// `AWS_PROFILE` and `AWS_DEFAULT_PROFILE`; this runs as a post step, after
/// which no user step can depend on a named profile.
pub async fn restore<R>(runner: &mut R, region: &str, aws_dir: Option<&Path>) -> RestoreOutcome
where
    R: RunState + Environment + SecretMasker,
{
    let Some(credentials_file) = runner.state(CREDENTIALS_FILE_KEY) else {
        return RestoreOutcome::NoState;
    };
    debug!("Restoring credentials from {}", credentials_file);

    let creds = match credentials::load_credentials(Path::new(&credentials_file)).await {
        Ok(creds) => creds,
        Err(e) => return RestoreOutcome::Failed(format!("{e:#}")),
    };

    // Mask again: this is a new process and may log values the setup step masked
    for secret in creds.secrets().into_iter().filter(|s| !s.is_empty()) {
        runner.set_secret(secret);
    }

    if !creds.is_complete() {
        return RestoreOutcome::Incomplete;
    }

    if let Err(e) = export_credentials(runner, &creds, region) {
        return RestoreOutcome::Failed(format!("{e:#}"));
    }

    let fallback = match aws_dir {
        Some(dir) => match profile::save_default_profile(dir, &creds, region).await {
            Ok(()) => FallbackStatus::Written(dir.to_path_buf()),
            Err(e) => FallbackStatus::Failed(format!("{e:#}")),
        },
        None => FallbackStatus::Failed("Failed to determine home directory".to_string()),
    };

    RestoreOutcome::Restored { fallback }
}

fn export_credentials<R>(runner: &mut R, creds: &Credentials, region: &str) -> anyhow::Result<()>
where
    R: Environment,
{
    runner.export_variable(AWS_ACCESS_KEY_ID, &creds.access_key_id)?;
    runner.export_variable(AWS_SECRET_ACCESS_KEY, &creds.secret_access_key)?;
    runner.export_variable(AWS_SESSION_TOKEN, &creds.session_token)?;
    runner.export_variable(AWS_REGION_VAR, region)?;
    runner.export_variable(AWS_DEFAULT_REGION_VAR, region)?;
    runner.export_variable(AWS_PROFILE_VAR, "")?;
    runner.export_variable(AWS_DEFAULT_PROFILE_VAR, "")?;
    Ok(())
}

/// Run the restore phase, turning every non-success outcome into a warning
pub async fn run<R>(runner: &mut R, region: &str, aws_dir: Option<&Path>) -> RestoreOutcome
where
    R: RunState + Environment + SecretMasker + Annotations,
{
    let outcome = restore(runner, region, aws_dir).await;

    match &outcome {
        RestoreOutcome::NoState => {
            runner.warning("No credentials file path in state, skipping credential restore")
        }
        RestoreOutcome::Failed(message) => {
            runner.warning(&format!("Failed to restore credentials: {message}"))
        }
        RestoreOutcome::Incomplete => {
            runner.warning("Credentials file is missing required fields, skipping")
        }
        RestoreOutcome::Restored { fallback } => {
            match fallback {
                FallbackStatus::Written(dir) => info!(
                    "Fallback AWS profile written to {} for tools that ignore environment variables",
                    dir.display()
                ),
                FallbackStatus::Failed(message) => {
                    runner.warning(&format!("Failed to write fallback AWS profile: {message}"))
                }
            }
            info!("Cache credentials restored for post-step cache save");
        }
    }

    outcome
}
