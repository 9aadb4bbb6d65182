use anyhow::{Context, Result};
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use std::path::Path;
use tracing::debug;

use super::{
    Credentials,
    credentials::{create_private_dir, write_private_file},
};
use crate::constants::{AWS_CONFIG_FILE_NAME, AWS_CREDENTIALS_FILE_NAME};

/// Section written into both profile files
pub const DEFAULT_PROFILE: &str = "default";

/// Existing profile file, or an empty document when there is none yet.
/// A file that does not parse is an error: rewriting it would drop every
/// profile in it.
fn load_or_new(path: &Path) -> Result<Ini> {
    if !path.exists() {
        return Ok(Ini::new());
    }

    // Values are written back verbatim, so read them verbatim too
    let option = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    };
    Ini::load_from_file_opt(path, option)
        .with_context(|| format!("Failed to parse existing {}", path.display()))
}

async fn write_ini(path: &Path, ini: &Ini) -> Result<()> {
    // AWS tooling does not unescape values; write them verbatim as `key = value`
    let option = WriteOption {
        escape_policy: EscapePolicy::Nothing,
        kv_separator: " = ",
        ..Default::default()
    };

    let mut buffer = Vec::new();
    ini.write_to_opt(&mut buffer, option)
        .with_context(|| format!("Failed to render {}", path.display()))?;

    write_private_file(path, &buffer).await
}

/// Mirror credentials into `<aws_dir>/credentials` and `<aws_dir>/config`
/// under the `[default]` profile, for tools that ignore environment
/// variables. Other profiles already present in those files are kept.
pub async fn save_default_profile(aws_dir: &Path, creds: &Credentials, region: &str) -> Result<()> {
    create_private_dir(aws_dir).await?;

    let credentials_path = aws_dir.join(AWS_CREDENTIALS_FILE_NAME);
    let mut credentials = load_or_new(&credentials_path)?;
    credentials
        .with_section(Some(DEFAULT_PROFILE))
        .set("aws_access_key_id", &creds.access_key_id)
        .set("aws_secret_access_key", &creds.secret_access_key)
        .set("aws_session_token", &creds.session_token);
    write_ini(&credentials_path, &credentials)
        .await
        .context("Failed to write AWS credentials file")?;
    debug!("Wrote {}", credentials_path.display());

    let config_path = aws_dir.join(AWS_CONFIG_FILE_NAME);
    let mut config = load_or_new(&config_path)?;
    config
        .with_section(Some(DEFAULT_PROFILE))
        .set("region", region);
    write_ini(&config_path, &config)
        .await
        .context("Failed to write AWS config file")?;
    debug!("Wrote {}", config_path.display());

    Ok(())
}
