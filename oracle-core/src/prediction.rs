//! Prediction types across the lifecycle
//!
//! A prediction starts as a [`PredictionCandidate`] parsed from model output,
//! becomes a [`NormalizedPrediction`] once the fixed market policy is
//! attached, and is later read back from the contract as an
//! [`OnChainPrediction`].

use serde::{Deserialize, Serialize};

use crate::{OracleError, OracleResult, Outcome};

/// Longest resolution window a generated prediction may ask for (180 days)
pub const MAX_PREDICTION_DURATION_SECS: u64 = 180 * 24 * 60 * 60;

/// Fewest tags a generated prediction may carry
pub const MIN_TAGS: usize = 3;

/// Most tags a generated prediction may carry
pub const MAX_TAGS: usize = 5;

/// A generated but not-yet-submitted prediction question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionCandidate {
    pub description: String,
    /// Resolution window in seconds
    pub duration: u64,
    pub tags: Vec<String>,
}

impl PredictionCandidate {
    /// Check the candidate against the shape the market accepts.
    pub fn validate(&self) -> OracleResult<()> {
        if self.description.trim().is_empty() {
            return Err(OracleError::generation("prediction description is empty"));
        }

        if self.duration == 0 || self.duration > MAX_PREDICTION_DURATION_SECS {
            return Err(OracleError::generation(format!(
                "prediction duration {}s outside 1..={}s: {}",
                self.duration, MAX_PREDICTION_DURATION_SECS, self.description
            )));
        }

        if !(MIN_TAGS..=MAX_TAGS).contains(&self.tags.len()) {
            return Err(OracleError::generation(format!(
                "prediction has {} tags, expected {}-{}: {}",
                self.tags.len(),
                MIN_TAGS,
                MAX_TAGS,
                self.description
            )));
        }

        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(OracleError::generation(format!(
                "prediction has an empty tag: {}",
                self.description
            )));
        }

        Ok(())
    }

    /// Attach the fixed market policy.
    pub fn normalize(self) -> NormalizedPrediction {
        NormalizedPrediction {
            candidate: self,
            policy: MarketPolicy::STANDARD,
        }
    }
}

/// Market parameters fixed for every prediction this oracle creates
///
/// These are never taken from model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPolicy {
    pub min_votes: u64,
    pub max_votes: u64,
    pub prediction_type: u8,
    pub options_count: u8,
}

impl MarketPolicy {
    pub const STANDARD: MarketPolicy = MarketPolicy {
        min_votes: 1,
        max_votes: 1000,
        prediction_type: 0,
        options_count: 2,
    };
}

impl Default for MarketPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A candidate with the market policy attached, ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPrediction {
    #[serde(flatten)]
    pub candidate: PredictionCandidate,
    #[serde(flatten)]
    pub policy: MarketPolicy,
}

impl NormalizedPrediction {
    pub fn description(&self) -> &str {
        &self.candidate.description
    }
}

/// Prediction as stored by the market contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainPrediction {
    pub description: String,
    pub duration: u64,
    pub min_votes: u64,
    pub max_votes: u64,
    pub prediction_type: u8,
    pub options_count: u8,
    pub tags: Vec<String>,
    pub is_finalized: bool,
    /// Only meaningful once `is_finalized` is set
    pub outcome: Option<Outcome>,
}

/// Per-address voting statistics as reported by the market contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_votes: u64,
    pub correct_votes: u64,
    pub reputation: u64,
}
