use std::{env, path::PathBuf};

use dirs;

/// Identity provider name used as the key of the Cognito logins map
pub const IDENTITY_PROVIDER: &str = "token.actions.githubusercontent.com";

/// Audience requested for the GitHub OIDC token
pub const AUDIENCE: &str = "cognito-identity.amazonaws.com";

/// AWS region hosting the identity pools and used for restored credentials
pub const AWS_REGION: &str = "eu-central-1";

/// Environment selected when the `environment` input is not supplied
pub const DEFAULT_ENVIRONMENT: &str = "prod";

pub const PROD_POOL_ID: &str = "eu-central-1:511fe374-ae4f-46d0-adb7-9246e570c7f4";
pub const PROD_ACCOUNT_ID: &str = "275878209202";
pub const DEV_POOL_ID: &str = "eu-central-1:3221c6ea-3f67-4fd8-a7ff-7426f96add89";
pub const DEV_ACCOUNT_ID: &str = "460386131003";

/// Action input selecting the identity pool
pub const ENVIRONMENT_INPUT: &str = "environment";

/// Input, output and run-state key carrying the persisted credentials path
pub const CREDENTIALS_FILE_KEY: &str = "credentials-file";

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION_VAR: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION_VAR: &str = "AWS_DEFAULT_REGION";
pub const AWS_PROFILE_VAR: &str = "AWS_PROFILE";
pub const AWS_DEFAULT_PROFILE_VAR: &str = "AWS_DEFAULT_PROFILE";

/// Name of the persisted credentials file inside the credentials directory
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Prefix of the per-run credentials directory under the temp directory
pub const CREDENTIALS_DIR_PREFIX: &str = ".gh-action-cache-";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// Unix permissions for directories holding credential material
pub const PRIVATE_DIR_MODE: u32 = 0o700;

/// Unix permissions for files holding credential material
pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Get the per-run credentials directory
/// Uses GITHUB_RUN_ID so concurrent runs on one host do not collide
pub fn default_credentials_dir() -> PathBuf {
    let run_id = env::var("GITHUB_RUN_ID")
        .ok()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    env::temp_dir().join(format!("{CREDENTIALS_DIR_PREFIX}{run_id}"))
}

/// Get the AWS configuration directory (`~/.aws`)
pub fn default_aws_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME))
}
