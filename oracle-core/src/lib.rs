//! Core types for the Prediction Oracle
//!
//! This crate defines the shared data structures used across the oracle:
//! generated predictions, the fixed market policy, binary outcomes, the
//! decoded on-chain views, and the error taxonomy every stage reports with.

pub mod error;
pub mod outcome;
pub mod prediction;

pub use error::{OracleError, OracleResult};
pub use outcome::Outcome;
pub use prediction::{
    MarketPolicy, NormalizedPrediction, OnChainPrediction, PredictionCandidate, UserStats,
    MAX_PREDICTION_DURATION_SECS, MAX_TAGS, MIN_TAGS,
};
