//! Wire format of GitHub Actions workflow commands and file commands.

use anyhow::{Result, bail};
use uuid::Uuid;

/// Escape the data part of a `::command::data` workflow command
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a workflow command such as `::add-mask::value`
pub fn issue(command: &str, message: &str) -> String {
    format!("::{}::{}", command, escape_data(message))
}

/// Format a key/value pair for a file command (`GITHUB_OUTPUT`, `GITHUB_ENV`, ...)
/// using a random heredoc delimiter
pub fn key_value_message(key: &str, value: &str) -> Result<String> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());

    if key.contains(&delimiter) {
        bail!("Unexpected input: name should not contain the delimiter \"{delimiter}\"");
    }
    if value.contains(&delimiter) {
        bail!("Unexpected input: value should not contain the delimiter \"{delimiter}\"");
    }

    Ok(format!("{key}<<{delimiter}\n{value}\n{delimiter}\n"))
}
