use anyhow::Result;
use clap::Args;
use std::process::ExitCode;
use tracing::info;

use crate::{
    actions::{Annotations, GithubRunner, Inputs, RunState},
    constants::CREDENTIALS_FILE_KEY,
};

#[derive(Debug, Clone, Args)]
pub struct GuardCommand {}

impl GuardCommand {
    pub async fn execute(self) -> ExitCode {
        let mut runner = GithubRunner::new();
        run(&mut runner);
        super::exit_code(&runner)
    }
}

/// Record the credentials file path in run state for the post step.
/// Never looks at the credentials themselves.
pub fn register<R>(runner: &mut R) -> Result<String>
where
    R: Inputs + RunState,
{
    let credentials_file = runner.required_input(CREDENTIALS_FILE_KEY)?;
    runner.save_state(CREDENTIALS_FILE_KEY, &credentials_file)?;

    info!("Credential guard registered (file: {})", credentials_file);
    info!("Credentials will be restored in post-step before cache save");
    Ok(credentials_file)
}

pub fn run<R>(runner: &mut R)
where
    R: Inputs + RunState + Annotations,
{
    if let Err(e) = register(runner) {
        runner.set_failed(&format!("Credential guard setup failed: {e:#}"));
    }
}
