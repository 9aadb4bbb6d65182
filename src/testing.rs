//! Test doubles for the runner, the OIDC token service and Cognito.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex};

use crate::{
    actions::{
        Annotations, Environment, Inputs, Outputs, RunState, SecretMasker, oidc::IdTokenProvider,
    },
    aws::cognito::{FederatedCredentials, IdentityFederation, Logins},
};

/// Records every interaction a phase has with the runner
#[derive(Debug, Default)]
pub struct MemoryRunner {
    pub inputs: HashMap<String, String>,
    pub state: HashMap<String, String>,
    pub outputs: Vec<(String, String)>,
    pub exported: Vec<(String, String)>,
    pub secrets: Vec<String>,
    pub warnings: Vec<String>,
    pub failures: Vec<String>,
    pub fail_exports: bool,
    pub fail_outputs: bool,
}

impl MemoryRunner {
    pub fn with_input(mut self, name: &str, value: &str) -> Self {
        self.inputs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_state(mut self, name: &str, value: &str) -> Self {
        self.state.insert(name.to_string(), value.to_string());
        self
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn exported(&self, name: &str) -> Option<&str> {
        self.exported
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Inputs for MemoryRunner {
    fn input(&self, name: &str) -> Option<String> {
        self.inputs.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

impl Outputs for MemoryRunner {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_outputs(&[(name, value)])
    }

    fn set_outputs(&mut self, outputs: &[(&str, &str)]) -> Result<()> {
        if self.fail_outputs {
            bail!("Unable to find environment variable for file command GITHUB_OUTPUT");
        }
        self.outputs.extend(
            outputs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        Ok(())
    }
}

impl RunState for MemoryRunner {
    fn save_state(&mut self, name: &str, value: &str) -> Result<()> {
        self.state.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn state(&self, name: &str) -> Option<String> {
        self.state.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

impl Environment for MemoryRunner {
    fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        if self.fail_exports {
            bail!("Unable to find environment variable for file command GITHUB_ENV");
        }
        self.exported.push((name.to_string(), value.to_string()));
        Ok(())
    }
}

impl SecretMasker for MemoryRunner {
    fn set_secret(&mut self, value: &str) {
        self.secrets.push(value.to_string());
    }
}

impl Annotations for MemoryRunner {
    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn set_failed(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}

/// Token provider returning a fixed token or a fixed error
pub struct StaticIdToken {
    result: Result<String, String>,
    audiences: Mutex<Vec<String>>,
}

impl StaticIdToken {
    pub fn ok(token: &str) -> Self {
        Self {
            result: Ok(token.to_string()),
            audiences: Mutex::default(),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            audiences: Mutex::default(),
        }
    }

    pub fn audiences(&self) -> Vec<String> {
        self.audiences.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdTokenProvider for StaticIdToken {
    async fn id_token(&self, audience: &str) -> Result<String> {
        self.audiences.lock().unwrap().push(audience.to_string());
        self.result.clone().map_err(|e| anyhow!(e))
    }
}

/// One recorded Cognito call: `pool/account` for GetId, the identity id for
/// GetCredentialsForIdentity
#[derive(Debug, Clone)]
pub struct FederationCall {
    pub target: String,
    pub logins: Logins,
}

/// Cognito double answering with canned responses
pub struct ScriptedFederation {
    identity_id: Option<String>,
    credentials: Option<FederatedCredentials>,
    calls: Mutex<Vec<FederationCall>>,
}

impl ScriptedFederation {
    pub fn new(identity_id: Option<&str>, credentials: Option<FederatedCredentials>) -> Self {
        Self {
            identity_id: identity_id.map(str::to_string),
            credentials,
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<FederationCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityFederation for ScriptedFederation {
    async fn get_id(
        &self,
        pool_id: &str,
        account_id: &str,
        logins: &Logins,
    ) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(FederationCall {
            target: format!("{pool_id}/{account_id}"),
            logins: logins.clone(),
        });
        Ok(self.identity_id.clone())
    }

    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: &Logins,
    ) -> Result<Option<FederatedCredentials>> {
        self.calls.lock().unwrap().push(FederationCall {
            target: identity_id.to_string(),
            logins: logins.clone(),
        });
        Ok(self.credentials.clone())
    }
}
