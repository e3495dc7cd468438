use std::{sync::Arc, time::Duration};

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::{
    constants::quiz_prompt::build_quiz_prompt,
    errors::{AppError, AppResult},
    models::{domain::Question, dto::generated::GeneratedQuiz},
    services::model_service::{CompletionClient, ModelError},
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n(.*?)\n?\s*```\s*$")
        .expect("CODE_FENCE is a valid regex pattern")
});

/// Turns a topic into validated questions through one model call per attempt.
pub struct QuizGenerator {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
    retries: u32,
}

impl QuizGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration, retries: u32) -> Self {
        Self {
            client,
            timeout,
            retries,
        }
    }

    pub async fn generate(&self, topic: &str, count: usize) -> AppResult<Vec<Question>> {
        let prompt = build_quiz_prompt(topic, count);
        let raw = self.complete_with_retry(&prompt).await?;

        let questions = parse_questions(&raw, count).inspect_err(|e| {
            log::warn!("Rejected model output for topic '{}': {}", topic, e);
        })?;

        log::info!("Generated {} questions for topic '{}'", questions.len(), topic);
        Ok(questions)
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<String, ModelError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.complete_once(prompt).await {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_transient() && attempt <= self.retries => {
                    log::warn!("Quiz generation attempt {} failed, retrying: {}", attempt, e);
                }
                Err(e) => {
                    log::error!("Quiz generation failed after {} attempt(s): {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    async fn complete_once(&self, prompt: &str) -> Result<String, ModelError> {
        tokio::time::timeout(self.timeout, self.client.complete(prompt))
            .await
            .map_err(|_| ModelError::Timeout(self.timeout))?
    }
}

/// Strictly parses a model reply into exactly `count` questions.
pub fn parse_questions(raw: &str, count: usize) -> AppResult<Vec<Question>> {
    let json = strip_code_fence(raw);

    let quiz: GeneratedQuiz = serde_json::from_str(json).map_err(|e| {
        AppError::GenerationError(format!("model reply is not valid quiz JSON: {}", e))
    })?;

    quiz.validate()
        .map_err(|e| AppError::GenerationError(format!("model reply failed validation: {}", e)))?;

    if quiz.questions.len() != count {
        return Err(AppError::GenerationError(format!(
            "expected {} questions, model returned {}",
            count,
            quiz.questions.len()
        )));
    }

    quiz.questions
        .into_iter()
        .enumerate()
        .map(|(i, generated)| {
            Question::try_from(generated).map_err(|e| {
                AppError::GenerationError(format!("question {} is malformed: {}", i + 1, e))
            })
        })
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw.trim(), |m| m.as_str().trim())
}
