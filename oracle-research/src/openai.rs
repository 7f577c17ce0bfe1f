use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use oracle_core::{OracleError, OracleResult};
use tracing::{debug, instrument};

/// A text-completion backend: one system prompt, one user prompt, one answer.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> OracleResult<String>;
}

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: "gpt-4o".to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl CompletionModel for OpenAIClient {
    #[instrument(skip(self, system, user))]
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> OracleResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| OracleError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| OracleError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(temperature)
            .build()
            .map_err(|e| OracleError::internal(e.to_string()))?;

        debug!("Sending {} prompt chars to {}", system.len() + user.len(), self.model);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| OracleError::internal(format!("OpenAI API error: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::internal("No response from OpenAI"))
    }
}
