use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    services::{
        model_service::{completion_client_from_config, CompletionClient},
        quiz_generator::QuizGenerator,
        quiz_service::QuizService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        config.validate()?;
        let client = completion_client_from_config(&config);
        Ok(Self::with_completion_client(config, client))
    }

    /// Wires the services around an already built completion client.
    pub fn with_completion_client(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let generator = QuizGenerator::new(
            client,
            config.generation_timeout(),
            config.generation_retries,
        );
        let quiz_service = Arc::new(QuizService::new(
            generator,
            config.default_question_count,
            config.session_ttl(),
        ));

        Self {
            quiz_service,
            config: Arc::new(config),
        }
    }
}
