use anyhow::{Result, bail};
use std::collections::BTreeMap;

use crate::constants::{
    AWS_REGION, DEV_ACCOUNT_ID, DEV_POOL_ID, PROD_ACCOUNT_ID, PROD_POOL_ID,
};

/// Identity pool and owning account for one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSelector {
    pub pool_id: String,
    pub account_id: String,
}

/// Everything the identity exchange needs to reach a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub pool_id: String,
    pub account_id: String,
    pub region: String,
}

/// Static mapping from environment name to identity pool.
/// All pools share one region.
#[derive(Debug, Clone)]
pub struct PoolTable {
    region: String,
    pools: BTreeMap<String, PoolSelector>,
}

impl PoolTable {
    pub fn new<I, K>(region: impl Into<String>, pools: I) -> Self
    where
        I: IntoIterator<Item = (K, PoolSelector)>,
        K: Into<String>,
    {
        Self {
            region: region.into(),
            pools: pools.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resolve an environment name. Unknown names are rejected, never defaulted.
    pub fn resolve(&self, environment: &str) -> Result<AuthConfig> {
        let Some(selector) = self.pools.get(environment) else {
            let known = self
                .pools
                .keys()
                .map(|name| format!("'{name}'"))
                .collect::<Vec<_>>()
                .join(" or ");
            bail!("Unknown environment: {environment}. Use {known}.");
        };

        Ok(AuthConfig {
            pool_id: selector.pool_id.clone(),
            account_id: selector.account_id.clone(),
            region: self.region.clone(),
        })
    }
}

impl Default for PoolTable {
    fn default() -> Self {
        Self::new(
            AWS_REGION,
            [
                (
                    "prod",
                    PoolSelector {
                        pool_id: PROD_POOL_ID.to_string(),
                        account_id: PROD_ACCOUNT_ID.to_string(),
                    },
                ),
                (
                    "dev",
                    PoolSelector {
                        pool_id: DEV_POOL_ID.to_string(),
                        account_id: DEV_ACCOUNT_ID.to_string(),
                    },
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prod() {
        let config = PoolTable::default().resolve("prod").unwrap();

        assert_eq!(config.pool_id, PROD_POOL_ID);
        assert_eq!(config.account_id, PROD_ACCOUNT_ID);
        assert_eq!(config.region, "eu-central-1");
    }

    #[test]
    fn test_resolve_dev() {
        let config = PoolTable::default().resolve("dev").unwrap();

        assert_eq!(config.pool_id, DEV_POOL_ID);
        assert_eq!(config.account_id, DEV_ACCOUNT_ID);
    }

    #[test]
    fn test_resolve_unknown_environment() {
        let err = PoolTable::default().resolve("staging").unwrap_err();
        let message = err.to_string();

        assert!(message.contains("Unknown environment: staging"));
        assert!(message.contains("'dev'"));
        assert!(message.contains("'prod'"));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert!(PoolTable::default().resolve("PROD").is_err());
    }

    #[test]
    fn test_custom_table() {
        let table = PoolTable::new(
            "us-west-2",
            [(
                "qa",
                PoolSelector {
                    pool_id: "us-west-2:pool".to_string(),
                    account_id: "111".to_string(),
                },
            )],
        );

        let config = table.resolve("qa").unwrap();
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.pool_id, "us-west-2:pool");
        assert!(table.resolve("prod").is_err());
    }
}
