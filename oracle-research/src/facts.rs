use async_trait::async_trait;
use oracle_core::{OracleError, OracleResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar";

const DIGEST_SYSTEM_PROMPT: &str = "You are a research assistant. Report recent, verifiable facts \
about the user's query. Be concise and precise, include dates and figures where they exist, and \
say so plainly when reliable current information is not available.";

/// Source of short, current, textual digests for a query
#[async_trait]
pub trait FactProvider: Send + Sync {
    async fn fetch_digest(&self, query: &str) -> OracleResult<String>;
}

/// Perplexity chat-completions client used as the fact provider
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
pub struct DigestRequest {
    pub model: String,
    pub messages: Vec<DigestMessage>,
    pub return_citations: bool,
    pub return_images: bool,
    pub return_related_questions: bool,
    pub search_recency_filter: String, // "hour", "day", "week", "month"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DigestResponse {
    pub choices: Vec<DigestChoice>,
    #[serde(default)]
    pub citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DigestChoice {
    pub message: DigestMessage,
}

impl PerplexityClient {
    pub fn new(api_key: impl Into<String>) -> OracleResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| OracleError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: PERPLEXITY_API_BASE.to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn digest_request(&self, query: &str) -> DigestRequest {
        DigestRequest {
            model: self.model.clone(),
            messages: vec![
                DigestMessage {
                    role: "system".to_string(),
                    content: DIGEST_SYSTEM_PROMPT.to_string(),
                },
                DigestMessage {
                    role: "user".to_string(),
                    content: format!(
                        "What are the latest developments and verifiable facts about: {}",
                        query
                    ),
                },
            ],
            return_citations: true,
            return_images: false,
            return_related_questions: false,
            search_recency_filter: "month".to_string(),
        }
    }
}

#[async_trait]
impl FactProvider for PerplexityClient {
    #[instrument(skip(self))]
    async fn fetch_digest(&self, query: &str) -> OracleResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.digest_request(query))
            .send()
            .await
            .map_err(|e| OracleError::retrieval(format!("Perplexity API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::retrieval(format!(
                "Perplexity API error ({}): {}",
                status, body
            )));
        }

        let digest: DigestResponse = response.json().await.map_err(|e| {
            OracleError::retrieval(format!("Failed to parse Perplexity response: {}", e))
        })?;

        debug!("Digest for {:?} cites {} sources", query, digest.citations.len());

        digest
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| OracleError::retrieval("Perplexity returned an empty answer"))
    }
}
