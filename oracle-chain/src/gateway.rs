//! Chain access for the prediction market contract
//!
//! [`ChainGateway`] is the seam the sequencer and the lifecycle orchestrator
//! talk through; [`AlloyGateway`] implements it over an HTTP JSON-RPC provider
//! with the local signing wallet attached.

use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use oracle_core::{OnChainPrediction, OracleError, OracleResult, UserStats};
use tracing::{debug, info, instrument};

use crate::contract::{
    decode_prediction_details, decode_user_stats, prediction_details_calldata, user_stats_calldata,
    ContractCall,
};
use crate::wallet::SigningWallet;

/// Default time to wait for a transaction to be included in a block
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Operations the oracle needs from the chain
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Address of the signing identity
    fn signer_address(&self) -> Address;

    /// Pending transaction count of the signing identity
    async fn transaction_count(&self) -> OracleResult<u64>;

    /// Sign and broadcast a contract write with an explicit nonce.
    ///
    /// Returns once the node has accepted the transaction. Failures are
    /// reported as [`OracleError::Rpc`] carrying the node's message.
    async fn send(&self, call: &ContractCall, nonce: u64) -> OracleResult<TxHash>;

    /// Wait for a broadcast transaction to be included and succeed.
    async fn confirm(&self, tx_hash: TxHash) -> OracleResult<()>;

    async fn prediction_details(&self, prediction_id: u64) -> OracleResult<OnChainPrediction>;

    async fn user_stats(&self, user: Address) -> OracleResult<UserStats>;
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub rpc_url: String,
    pub contract_address: Address,
    pub confirmation_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(rpc_url: impl Into<String>, contract_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

pub struct AlloyGateway {
    provider: DynProvider,
    contract: Address,
    signer: Address,
    confirmation_timeout: Duration,
}

impl AlloyGateway {
    pub fn connect(config: &GatewayConfig, wallet: &SigningWallet) -> OracleResult<Self> {
        let url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| OracleError::config(format!("Invalid RPC URL {}: {}", config.rpc_url, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(wallet.signer().clone()))
            .connect_http(url)
            .erased();

        info!(
            "Chain gateway ready: contract {} signer {}",
            config.contract_address,
            wallet.address()
        );

        Ok(Self {
            provider,
            contract: config.contract_address,
            signer: wallet.address(),
            confirmation_timeout: config.confirmation_timeout,
        })
    }

    async fn read(&self, calldata: alloy::primitives::Bytes) -> OracleResult<alloy::primitives::Bytes> {
        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(calldata);

        self.provider
            .call(tx)
            .await
            .map_err(|e| OracleError::contract_read(format!("eth_call failed: {}", e)))
    }
}

#[async_trait]
impl ChainGateway for AlloyGateway {
    fn signer_address(&self) -> Address {
        self.signer
    }

    #[instrument(skip(self))]
    async fn transaction_count(&self) -> OracleResult<u64> {
        self.provider
            .get_transaction_count(self.signer)
            .pending()
            .await
            .map_err(|e| OracleError::rpc(format!("eth_getTransactionCount failed: {}", e)))
    }

    #[instrument(skip(self, call), fields(method = call.method()))]
    async fn send(&self, call: &ContractCall, nonce: u64) -> OracleResult<TxHash> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(self.contract)
            .with_input(call.calldata())
            .with_nonce(nonce);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| OracleError::rpc(e.to_string()))?;

        debug!("Broadcast {} with nonce {}: {}", call.method(), nonce, pending.tx_hash());
        Ok(*pending.tx_hash())
    }

    #[instrument(skip(self))]
    async fn confirm(&self, tx_hash: TxHash) -> OracleResult<()> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|e| OracleError::confirmation(format!("{}: {}", tx_hash, e)))?;

        if !receipt.status() {
            return Err(OracleError::confirmation(format!(
                "transaction {} reverted",
                tx_hash
            )));
        }

        debug!("Confirmed {} in block {:?}", tx_hash, receipt.block_number);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prediction_details(&self, prediction_id: u64) -> OracleResult<OnChainPrediction> {
        let data = self.read(prediction_details_calldata(prediction_id)).await?;
        decode_prediction_details(&data)
    }

    #[instrument(skip(self))]
    async fn user_stats(&self, user: Address) -> OracleResult<UserStats> {
        let data = self.read(user_stats_calldata(user)).await?;
        decode_user_stats(&data)
    }
}
