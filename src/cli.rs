use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;

use crate::commands::{GuardCommand, RestoreCommand, SetupCommand};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "credential-guard",
    version,
    about = "Hand AWS credentials obtained via GitHub OIDC across workflow steps",
    long_about = None
)]
pub struct Cli {
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v debug, -vv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Exchange the OIDC token for AWS credentials and persist them")]
    Setup(SetupCommand),
    #[command(about = "Record the persisted credentials file for the post step")]
    Guard(GuardCommand),
    #[command(about = "Restore persisted credentials into the job environment")]
    Restore(RestoreCommand),
}

impl Cli {
    pub async fn execute(self) -> ExitCode {
        match self.command {
            Commands::Setup(cmd) => cmd.execute().await,
            Commands::Guard(cmd) => cmd.execute().await,
            Commands::Restore(cmd) => cmd.execute().await,
        }
    }
}
