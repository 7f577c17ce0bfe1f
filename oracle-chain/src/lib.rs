//! Oracle Chain - Prediction Market Contract Access
//!
//! This crate provides:
//! - The prediction market contract ABI and call encoding
//! - Signing wallet management (loading from env)
//! - A chain gateway over an alloy HTTP provider
//! - The transaction sequencer that owns the signer's nonce

pub mod contract;
pub mod gateway;
pub mod sequencer;
pub mod wallet;

pub use contract::{ContractCall, IPredictionMarket};
pub use gateway::{AlloyGateway, ChainGateway, GatewayConfig};
pub use sequencer::{is_stale_sequence_message, NonceLease, NonceManager, Submission, TransactionSequencer};
pub use wallet::SigningWallet;

pub use alloy::primitives::{Address, TxHash};
