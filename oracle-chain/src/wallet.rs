//! Signing wallet management - loading and address derivation

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use oracle_core::{OracleError, OracleResult};
use std::str::FromStr;
use tracing::info;

/// The single identity that signs every contract write
#[derive(Clone)]
pub struct SigningWallet {
    signer: PrivateKeySigner,
    address: Address,
}

impl SigningWallet {
    /// Create a wallet from a private key hex string
    pub fn from_private_key(private_key: &str) -> OracleResult<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let key_bytes = B256::from_str(key)
            .map_err(|e| OracleError::config(format!("Invalid private key format: {}", e)))?;

        let signer = PrivateKeySigner::from_bytes(&key_bytes)
            .map_err(|e| OracleError::config(format!("Failed to create signer: {}", e)))?;

        let address = signer.address();

        info!("Loaded signing wallet: {}", address);

        Ok(Self { signer, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for SigningWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningWallet")
            .field("address", &self.address)
            .finish()
    }
}
