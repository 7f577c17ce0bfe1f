//! Prediction generation
//!
//! Turns a topic into market-ready predictions: fetch a current digest for the
//! topic, ask the completion model for a JSON array of questions, validate
//! every entry, and attach the fixed market policy.

use std::sync::Arc;

use oracle_core::{
    NormalizedPrediction, OracleError, OracleResult, PredictionCandidate,
    MAX_PREDICTION_DURATION_SECS,
};
use tracing::{info, instrument};

use crate::{CompletionModel, FactProvider};

/// Moderate temperature: varied questions, stable format
pub const GENERATION_TEMPERATURE: f32 = 0.7;

const GENERATION_SYSTEM_PROMPT: &str = r#"You are a prediction market designer. You write clear, binary (yes/no) prediction questions grounded in current events.

Respond with ONLY a JSON array, no prose and no markdown. Each element must have exactly these fields:
[
  {
    "description": "A specific, measurable yes/no question",
    "duration": 2592000,
    "tags": ["tag1", "tag2", "tag3"]
  }
]"#;

pub struct PredictionGenerator {
    facts: Arc<dyn FactProvider>,
    model: Arc<dyn CompletionModel>,
}

impl PredictionGenerator {
    pub fn new(facts: Arc<dyn FactProvider>, model: Arc<dyn CompletionModel>) -> Self {
        Self { facts, model }
    }

    /// Generate normalized predictions for a topic.
    ///
    /// Any failure (retrieval, completion, parsing, or a single invalid entry)
    /// fails the whole topic.
    #[instrument(skip(self))]
    pub async fn generate(&self, topic: &str) -> OracleResult<Vec<NormalizedPrediction>> {
        let digest = self
            .facts
            .fetch_digest(topic)
            .await
            .map_err(|e| OracleError::generation(format!("fact retrieval failed: {}", e)))?;

        let prompt = build_generation_prompt(topic, &digest);
        let content = self
            .model
            .complete(GENERATION_SYSTEM_PROMPT, &prompt, GENERATION_TEMPERATURE)
            .await
            .map_err(|e| OracleError::generation(format!("completion failed: {}", e)))?;

        let predictions = parse_predictions(&content)?;
        info!("Generated {} predictions for {:?}", predictions.len(), topic);
        Ok(predictions)
    }
}

fn build_generation_prompt(topic: &str, digest: &str) -> String {
    format!(
        r#"## Topic
{topic}

## Current Information
{digest}

Write 3 prediction market questions about this topic based on the information above.

Requirements:
- Each question must be specific and measurable, with an unambiguous yes/no resolution
- Each question must be resolvable within 6 months; "duration" is the resolution window in seconds (1 to {max_duration})
- Each question has 3 to 5 short lowercase tags
- Cover different aspects of the topic; do not ask the same question twice"#,
        topic = topic,
        digest = digest,
        max_duration = MAX_PREDICTION_DURATION_SECS,
    )
}

/// Parse model output into normalized predictions.
fn parse_predictions(content: &str) -> OracleResult<Vec<NormalizedPrediction>> {
    let json_str = extract_json_array(content)?;

    let candidates: Vec<PredictionCandidate> = serde_json::from_str(json_str)
        .map_err(|e| OracleError::generation(format!("Failed to parse predictions: {}", e)))?;

    if candidates.is_empty() {
        return Err(OracleError::generation("model returned no predictions"));
    }

    candidates
        .into_iter()
        .map(|candidate| {
            candidate.validate()?;
            Ok(candidate.normalize())
        })
        .collect()
}

/// Extract a JSON array from a response (handles markdown code blocks)
fn extract_json_array(content: &str) -> OracleResult<&str> {
    for fence in ["```json", "```"] {
        if let Some(start) = content.find(fence) {
            let start = start + fence.len();
            if let Some(end) = content[start..].find("```") {
                return Ok(content[start..start + end].trim());
            }
        }
    }

    if let Some(start) = content.find('[') {
        if let Some(end) = content.rfind(']') {
            if end > start {
                return Ok(&content[start..=end]);
            }
        }
    }

    Err(OracleError::generation("No JSON array found in response"))
}
