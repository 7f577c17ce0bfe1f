//! Error types for the oracle

use thiserror::Error;

/// Oracle-wide error type
///
/// Each variant names the lifecycle stage that failed so callers can attach
/// the message to a per-item result or surface it as the request failure.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Adjudication error: {0}")]
    Adjudication(String),

    /// Submission rejected for a reason unrelated to sequencing (reverted
    /// execution, insufficient funds, transport failure).
    #[error("Sequencing error: {0}")]
    Sequencing(String),

    /// Submission rejected because the nonce was already used or out of order.
    #[error("Sequencing error (stale sequence): {0}")]
    StaleSequence(String),

    #[error("Contract read error: {0}")]
    ContractRead(String),

    #[error("Confirmation error: {0}")]
    Confirmation(String),

    /// Raw chain RPC failure, before the sequencer classifies it.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OracleError {
    pub fn retrieval(msg: impl Into<String>) -> Self {
        OracleError::Retrieval(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        OracleError::Generation(msg.into())
    }

    pub fn adjudication(msg: impl Into<String>) -> Self {
        OracleError::Adjudication(msg.into())
    }

    pub fn sequencing(msg: impl Into<String>) -> Self {
        OracleError::Sequencing(msg.into())
    }

    pub fn stale_sequence(msg: impl Into<String>) -> Self {
        OracleError::StaleSequence(msg.into())
    }

    pub fn contract_read(msg: impl Into<String>) -> Self {
        OracleError::ContractRead(msg.into())
    }

    pub fn confirmation(msg: impl Into<String>) -> Self {
        OracleError::Confirmation(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        OracleError::Rpc(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        OracleError::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        OracleError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        OracleError::Internal(msg.into())
    }

    /// True when the chain rejected a submission for its sequence number.
    pub fn is_stale_sequence(&self) -> bool {
        matches!(self, OracleError::StaleSequence(_))
    }

    /// True for caller mistakes (bad request input) rather than stage failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, OracleError::Validation(_))
    }
}

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;
