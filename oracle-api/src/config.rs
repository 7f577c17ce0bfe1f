//! Environment configuration for the API server

use std::time::Duration;

use oracle_chain::Address;
use oracle_core::{OracleError, OracleResult};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct AppConfig {
    pub perplexity_api_key: String,
    pub perplexity_model: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub rpc_url: String,
    pub contract_address: Address,
    pub private_key: String,
    pub confirmation_timeout: Duration,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> OracleResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OracleResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| OracleError::config(format!("{} environment variable not set", key)))
        };

        let contract_address = required("CONTRACT_ADDRESS")?;
        let contract_address: Address = contract_address.trim().parse().map_err(|e| {
            OracleError::config(format!("Invalid CONTRACT_ADDRESS {}: {}", contract_address, e))
        })?;

        let confirmation_timeout: u64 = match lookup("CONFIRMATION_TIMEOUT_SECS") {
            Some(secs) => secs.trim().parse().map_err(|_| {
                OracleError::config(format!("Invalid CONFIRMATION_TIMEOUT_SECS: {}", secs))
            })?,
            None => DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        };

        let port: u16 = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| OracleError::config(format!("Invalid port: {}", port)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            perplexity_api_key: required("PERPLEXITY_API_KEY")?,
            perplexity_model: lookup("PERPLEXITY_MODEL").unwrap_or_else(|| "sonar".to_string()),
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            rpc_url: required("RPC_URL")?,
            contract_address,
            private_key: required("PRIVATE_KEY")?,
            confirmation_timeout: Duration::from_secs(confirmation_timeout),
            port,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("perplexity_model", &self.perplexity_model)
            .field("openai_model", &self.openai_model)
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
