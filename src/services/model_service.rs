use std::{sync::Arc, time::Duration};

use async_openai::{
    config::{AzureConfig, Config as ProviderConfig, OpenAIConfig},
    Client,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    config::{Config, ModelProvider},
    errors::AppError,
};

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("model service request failed: {0}")]
    Request(String),

    #[error("model service did not respond within {0:?}")]
    Timeout(Duration),

    #[error("model service returned no content")]
    EmptyResponse,
}

impl ModelError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Request(_) | ModelError::Timeout(_))
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::GenerationError(err.to_string())
    }
}

/// A chat-completion backend: one prompt in, the raw text of the reply out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatCompletionBody {
    fn into_content(self) -> Result<String, ModelError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

/// Chat completions against OpenAI or an Azure OpenAI deployment.
pub struct ModelService<C: ProviderConfig> {
    client: Client<C>,
    model: String,
    temperature: f32,
}

impl ModelService<OpenAIConfig> {
    pub fn openai(config: &Config) -> Self {
        let provider_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.api_base);

        Self {
            client: Client::with_config(provider_config),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

impl ModelService<AzureConfig> {
    pub fn azure(config: &Config) -> Self {
        let provider_config = AzureConfig::new()
            .with_api_base(&config.api_base)
            .with_api_key(config.api_key.expose_secret())
            .with_deployment_id(&config.model)
            .with_api_version(&config.azure_api_version);

        Self {
            client: Client::with_config(provider_config),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

impl<C: ProviderConfig> ModelService<C> {
    fn request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "response_format": { "type": "json_object" }
        })
    }
}

#[async_trait]
impl<C> CompletionClient for ModelService<C>
where
    C: ProviderConfig + Send + Sync + 'static,
{
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        log::debug!("Requesting chat completion from model {}", self.model);

        let body: ChatCompletionBody = self
            .client
            .chat()
            .create_byot(self.request_body(prompt))
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        body.into_content()
    }
}

/// Builds the completion client for the configured provider.
pub fn completion_client_from_config(config: &Config) -> Arc<dyn CompletionClient> {
    match config.model_provider {
        ModelProvider::Azure => {
            log::info!("Using Azure OpenAI deployment {}", config.model);
            Arc::new(ModelService::azure(config))
        }
        ModelProvider::OpenAi => {
            log::info!("Using OpenAI model {}", config.model);
            Arc::new(ModelService::openai(config))
        }
    }
}
