//! Boundary to the GitHub Actions runner.
//!
//! The phases never touch the runner directly: inputs, outputs, run state,
//! exported variables, secret masking and annotations each sit behind a small
//! trait. [`GithubRunner`] speaks the real runner protocol; tests use an
//! in-memory recorder.

pub mod command;
pub mod oidc;

use anyhow::{Context, Result, bail};
use std::{
    env,
    fs::OpenOptions,
    io::{self, Stdout, Write},
    path::Path,
};

/// Read side of the step inputs (`with:` block of the action)
pub trait Inputs {
    /// Value of an input, `None` when absent or blank
    fn input(&self, name: &str) -> Option<String>;

    fn required_input(&self, name: &str) -> Result<String> {
        self.input(name)
            .with_context(|| format!("Input required and not supplied: {name}"))
    }
}

/// Write side of the step outputs
pub trait Outputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()>;

    /// Publish several outputs together. Adapters that can write them in one
    /// go override this so a failure publishes none of them.
    fn set_outputs(&mut self, outputs: &[(&str, &str)]) -> Result<()> {
        outputs
            .iter()
            .try_for_each(|(name, value)| self.set_output(name, value))
    }
}

/// Key/value state shared between the main and post halves of an action
pub trait RunState {
    fn save_state(&mut self, name: &str, value: &str) -> Result<()>;

    /// Value saved by an earlier half, `None` when nothing was saved
    fn state(&self, name: &str) -> Option<String>;
}

/// Variables exported to every later step of the job
pub trait Environment {
    fn export_variable(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Registers values the runner must redact from all log output
pub trait SecretMasker {
    fn set_secret(&mut self, value: &str);
}

/// Warning and failure annotations
pub trait Annotations {
    fn warning(&mut self, message: &str);

    /// Report the step as failed without aborting the caller
    fn set_failed(&mut self, message: &str);
}

/// Runner adapter for the GitHub Actions protocol: environment variables for
/// reads, file commands for writes, workflow commands on `out` (stdout)
#[derive(Debug)]
pub struct GithubRunner<W = Stdout> {
    failed: bool,
    out: W,
}

impl GithubRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for GithubRunner {
    fn default() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> GithubRunner<W> {
    /// Runner issuing its workflow commands to `out` instead of stdout
    pub fn with_writer(out: W) -> Self {
        Self { failed: false, out }
    }

    /// Whether [`Annotations::set_failed`] was called
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    fn issue(&mut self, command: &str, message: &str) {
        if let Err(e) = writeln!(self.out, "{}", command::issue(command, message)) {
            eprintln!("Failed to issue ::{command}:: workflow command: {e}");
        }
    }

    /// Append key/value pairs to the `GITHUB_<command>` file with a single
    /// write. Every message is formatted before the file is touched.
    fn append_file_command(command: &str, entries: &[(&str, &str)]) -> Result<()> {
        let variable = format!("GITHUB_{command}");
        let path = env::var(&variable)
            .ok()
            .filter(|path| !path.is_empty())
            .with_context(|| {
                format!("Unable to find environment variable for file command {variable}")
            })?;

        if !Path::new(&path).exists() {
            bail!("Missing file at path: {path}");
        }

        let message = entries
            .iter()
            .map(|(key, value)| command::key_value_message(key, value))
            .collect::<Result<String>>()?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {variable} file: {path}"))?;
        file.write_all(message.as_bytes())
            .with_context(|| format!("Failed to write to {variable} file: {path}"))?;

        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl<W: Write> Inputs for GithubRunner<W> {
    fn input(&self, name: &str) -> Option<String> {
        let variable = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        env::var(variable).ok().and_then(non_blank)
    }
}

impl<W: Write> Outputs for GithubRunner<W> {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        Self::append_file_command("OUTPUT", &[(name, value)])
    }

    fn set_outputs(&mut self, outputs: &[(&str, &str)]) -> Result<()> {
        Self::append_file_command("OUTPUT", outputs)
    }
}

impl<W: Write> RunState for GithubRunner<W> {
    fn save_state(&mut self, name: &str, value: &str) -> Result<()> {
        Self::append_file_command("STATE", &[(name, value)])
    }

    fn state(&self, name: &str) -> Option<String> {
        env::var(format!("STATE_{name}")).ok().and_then(non_blank)
    }
}

impl<W: Write> Environment for GithubRunner<W> {
    // Only later steps see the value; this process exits right after the phase
    fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        Self::append_file_command("ENV", &[(name, value)])
    }
}

impl<W: Write> SecretMasker for GithubRunner<W> {
    fn set_secret(&mut self, value: &str) {
        if !value.is_empty() {
            self.issue("add-mask", value);
        }
    }
}

impl<W: Write> Annotations for GithubRunner<W> {
    fn warning(&mut self, message: &str) {
        self.issue("warning", message);
    }

    fn set_failed(&mut self, message: &str) {
        self.failed = true;
        self.issue("error", message);
    }
}
