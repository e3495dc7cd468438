use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;

use crate::errors::{AppError, AppResult};

pub const MIN_QUESTION_COUNT: u16 = 1;
pub const MAX_QUESTION_COUNT: u16 = 30;

const DEFAULT_AZURE_API_VERSION: &str = "2024-12-01-preview";
const DEFAULT_MODEL: &str = "gpt-4.1-nano";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelProvider {
    Azure,
    OpenAi,
}

impl ModelProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "azure" => Some(ModelProvider::Azure),
            "openai" => Some(ModelProvider::OpenAi),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub model_provider: ModelProvider,
    pub api_key: SecretString,
    /// Azure resource endpoint or OpenAI-compatible API base.
    pub api_base: String,
    pub azure_api_version: String,
    /// Model name for OpenAI, deployment id for Azure.
    pub model: String,
    pub temperature: f32,
    pub generation_timeout_secs: u64,
    pub generation_retries: u32,
    pub default_question_count: u16,
    /// Sessions untouched for this long are dropped.
    pub session_ttl_secs: u64,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let azure_endpoint = env::var("AZURE_OPENAI_ENDPOINT").ok().filter(|v| !v.is_empty());

        let model_provider = env::var("MODEL_PROVIDER")
            .ok()
            .and_then(|p| ModelProvider::parse(&p))
            .unwrap_or(if azure_endpoint.is_some() {
                ModelProvider::Azure
            } else {
                ModelProvider::OpenAi
            });

        let (api_key, api_base, model) = match model_provider {
            ModelProvider::Azure => (
                env::var("AZURE_OPENAI_KEY").unwrap_or_default(),
                azure_endpoint.unwrap_or_default(),
                env::var("AZURE_OPENAI_DEPLOYMENT").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ),
            ModelProvider::OpenAi => (
                env::var("OPENAI_API_KEY").unwrap_or_default(),
                env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string()),
                env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ),
        };

        Self {
            model_provider,
            api_key: SecretString::from(api_key),
            api_base,
            azure_api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_AZURE_API_VERSION.to_string()),
            model,
            temperature: env::var("MODEL_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.7),
            generation_timeout_secs: env::var("GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(60),
            generation_retries: env::var("GENERATION_RETRIES")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(1),
            default_question_count: env::var("DEFAULT_QUESTION_COUNT")
                .ok()
                .and_then(|c| c.parse::<u16>().ok())
                .unwrap_or(3)
                .clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(3600),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Checks that the model service can be reached with this configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            let var = match self.model_provider {
                ModelProvider::Azure => "AZURE_OPENAI_KEY",
                ModelProvider::OpenAi => "OPENAI_API_KEY",
            };
            return Err(AppError::ValidationError(format!(
                "{} is not set; the model service needs a credential",
                var
            )));
        }

        if self.api_base.trim().is_empty() {
            let var = match self.model_provider {
                ModelProvider::Azure => "AZURE_OPENAI_ENDPOINT",
                ModelProvider::OpenAi => "OPENAI_API_BASE",
            };
            return Err(AppError::ValidationError(format!("{} is not set", var)));
        }

        if self.generation_timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "GENERATION_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.session_ttl_secs == 0 {
            return Err(AppError::ValidationError(
                "SESSION_TTL_SECS must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::ValidationError(format!(
                "MODEL_TEMPERATURE must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            model_provider: ModelProvider::OpenAi,
            api_key: SecretString::from("test_api_key".to_string()),
            api_base: "http://localhost:9999/v1".to_string(),
            azure_api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            generation_timeout_secs: 5,
            generation_retries: 1,
            default_question_count: 3,
            session_ttl_secs: 3600,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
