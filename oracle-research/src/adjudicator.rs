//! Outcome adjudication
//!
//! Asks the completion model whether a prediction has come true given a fresh
//! digest. The verdict must be alone on the final line of the answer; anything
//! else is an error, never a silent default.

use std::sync::Arc;

use oracle_core::{OracleError, OracleResult, Outcome};
use tracing::{info, instrument};

use crate::CompletionModel;

/// Low temperature for repeatable judging
pub const ADJUDICATION_TEMPERATURE: f32 = 0.1;

const ADJUDICATION_SYSTEM_PROMPT: &str = r#"You are an impartial judge resolving prediction markets.

Decide whether the prediction has come true based only on the information provided. If the evidence is missing, inconclusive, or the event has not happened yet, the answer is 0.

Explain your reasoning briefly, then put your verdict on the final line as a single digit with nothing else:
1 if the prediction is true
0 if it is false or cannot be confirmed"#;

pub struct OutcomeAdjudicator {
    model: Arc<dyn CompletionModel>,
}

impl OutcomeAdjudicator {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    #[instrument(skip(self, digest))]
    pub async fn adjudicate(&self, description: &str, digest: &str) -> OracleResult<Outcome> {
        let prompt = format!(
            "## Prediction\n{}\n\n## Current Information\n{}\n\nHas this prediction come true?",
            description, digest
        );

        let content = self
            .model
            .complete(ADJUDICATION_SYSTEM_PROMPT, &prompt, ADJUDICATION_TEMPERATURE)
            .await
            .map_err(|e| OracleError::adjudication(format!("completion failed: {}", e)))?;

        let outcome = parse_verdict(&content)?;
        info!("Adjudicated {:?} as {}", description, outcome);
        Ok(outcome)
    }
}

/// Read the verdict from the last non-empty line of a model answer.
pub fn parse_verdict(content: &str) -> OracleResult<Outcome> {
    let last_line = content
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| OracleError::adjudication("empty adjudication response"))?;

    match last_line {
        "0" => Ok(Outcome::No),
        "1" => Ok(Outcome::Yes),
        other => Err(OracleError::adjudication(format!(
            "final line is not a verdict: {:?}",
            other
        ))),
    }
}
