//! Prediction lifecycle orchestration
//!
//! Two flows run through here:
//!
//! - **Creation**: topic -> generated predictions -> one `createPrediction`
//!   write per prediction. Every prediction is reported back, each with either
//!   a transaction hash or the error that stopped it.
//! - **Finalization**: prediction id -> on-chain description -> fresh digest ->
//!   verdict -> `finalizePrediction` write. Any failing stage fails the request.
//!
//! Dry-run variants of both skip the chain entirely.

use std::sync::Arc;

use futures::future::join_all;
use oracle_chain::{Address, ChainGateway, ContractCall, TransactionSequencer};
use oracle_core::{
    NormalizedPrediction, OnChainPrediction, OracleError, OracleResult, Outcome, UserStats,
};
use oracle_research::{CompletionModel, FactProvider, OutcomeAdjudicator, PredictionGenerator};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// One generated prediction and what happened when it was submitted
#[derive(Debug, Clone, Serialize)]
pub struct PredictionSubmission {
    #[serde(flatten)]
    pub prediction: NormalizedPrediction,
    #[serde(flatten)]
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmissionStatus {
    Submitted {
        #[serde(rename = "transactionHash")]
        transaction_hash: String,
    },
    Failed {
        error: String,
    },
}

impl SubmissionStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionStatus::Submitted { .. })
    }
}

/// Result of a confirmed finalization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizationReceipt {
    pub prediction_id: u64,
    pub outcome: Outcome,
    pub transaction_hash: String,
}

/// Verdict for a free-text description, with the digest it was judged on
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicationPreview {
    pub description: String,
    pub outcome: Outcome,
    pub current_data: String,
}

pub struct LifecycleOrchestrator {
    facts: Arc<dyn FactProvider>,
    generator: PredictionGenerator,
    adjudicator: OutcomeAdjudicator,
    gateway: Arc<dyn ChainGateway>,
    sequencer: TransactionSequencer,
}

impl LifecycleOrchestrator {
    pub fn new(
        facts: Arc<dyn FactProvider>,
        model: Arc<dyn CompletionModel>,
        gateway: Arc<dyn ChainGateway>,
    ) -> Self {
        Self {
            generator: PredictionGenerator::new(facts.clone(), model.clone()),
            adjudicator: OutcomeAdjudicator::new(model),
            sequencer: TransactionSequencer::new(gateway.clone()),
            facts,
            gateway,
        }
    }

    pub fn signer_address(&self) -> Address {
        self.gateway.signer_address()
    }

    pub async fn pending_nonce(&self) -> Option<u64> {
        self.sequencer.pending_nonce().await
    }

    /// Generate predictions for a topic and submit each one on-chain.
    ///
    /// Generation failure fails the request. Submission failures are attached
    /// to their prediction; the returned list always has one entry per
    /// generated prediction, in generation order.
    #[instrument(skip(self))]
    pub async fn create_predictions(&self, topic: &str) -> OracleResult<Vec<PredictionSubmission>> {
        let predictions = self.generator.generate(topic).await?;

        // Submit in order so nonces follow the prediction order, then wait
        // for all confirmations together.
        let mut submitted = Vec::with_capacity(predictions.len());
        for prediction in &predictions {
            let call = ContractCall::CreatePrediction(prediction.clone());
            submitted.push(self.sequencer.submit(&call).await);
        }

        let confirmed = join_all(submitted.into_iter().map(|submission| async move {
            let submission = submission?;
            self.gateway.confirm(submission.tx_hash).await?;
            Ok::<_, OracleError>(submission.tx_hash)
        }))
        .await;

        let results: Vec<PredictionSubmission> = predictions
            .into_iter()
            .zip(confirmed)
            .map(|(prediction, result)| {
                let status = match result {
                    Ok(tx_hash) => SubmissionStatus::Submitted {
                        transaction_hash: tx_hash.to_string(),
                    },
                    Err(e) => {
                        warn!("Failed to create {:?}: {}", prediction.description(), e);
                        SubmissionStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                PredictionSubmission { prediction, status }
            })
            .collect();

        info!(
            "Created {}/{} predictions for {:?}",
            results.iter().filter(|r| r.status.is_submitted()).count(),
            results.len(),
            topic
        );

        Ok(results)
    }

    /// Adjudicate an on-chain prediction and submit the verdict.
    #[instrument(skip(self))]
    pub async fn finalize_prediction(&self, prediction_id: u64) -> OracleResult<FinalizationReceipt> {
        let prediction = self.gateway.prediction_details(prediction_id).await?;

        let digest = self.facts.fetch_digest(&prediction.description).await?;
        let outcome = self
            .adjudicator
            .adjudicate(&prediction.description, &digest)
            .await?;

        let call = ContractCall::FinalizePrediction {
            prediction_id,
            outcome,
        };
        let submission = self.sequencer.submit(&call).await?;
        self.gateway.confirm(submission.tx_hash).await?;

        info!(
            "Finalized prediction {} as {}: {}",
            prediction_id, outcome, submission.tx_hash
        );

        Ok(FinalizationReceipt {
            prediction_id,
            outcome,
            transaction_hash: submission.tx_hash.to_string(),
        })
    }

    /// Generate predictions without touching the chain.
    #[instrument(skip(self))]
    pub async fn preview_predictions(&self, topic: &str) -> OracleResult<Vec<NormalizedPrediction>> {
        self.generator.generate(topic).await
    }

    /// Retrieve and adjudicate a free-text description without touching the chain.
    #[instrument(skip(self))]
    pub async fn preview_adjudication(&self, description: &str) -> OracleResult<AdjudicationPreview> {
        let current_data = self.facts.fetch_digest(description).await?;
        let outcome = self.adjudicator.adjudicate(description, &current_data).await?;

        Ok(AdjudicationPreview {
            description: description.to_string(),
            outcome,
            current_data,
        })
    }

    pub async fn prediction_details(&self, prediction_id: u64) -> OracleResult<OnChainPrediction> {
        self.gateway.prediction_details(prediction_id).await
    }

    pub async fn user_stats(&self, user: Address) -> OracleResult<UserStats> {
        self.gateway.user_stats(user).await
    }
}
