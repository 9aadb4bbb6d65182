use std::process::ExitCode;

use crate::actions::GithubRunner;

pub mod guard;
pub mod restore;
pub mod setup;

pub use guard::GuardCommand;
pub use restore::RestoreCommand;
pub use setup::SetupCommand;

/// Exit code for a phase that reports failures through the runner
fn exit_code(runner: &GithubRunner) -> ExitCode {
    if runner.has_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
