use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;
use crate::models::domain::Question;

/// Payload the model is asked to return.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct GeneratedQuiz {
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct GeneratedQuestion {
    /// The question text shown to the player.
    #[validate(length(min = 1))]
    pub question: String,

    /// Exactly four distinct answer options, in display order.
    #[validate(length(equal = 4))]
    pub options: Vec<String>,

    /// Zero-based index into `options` of the correct answer.
    #[validate(range(max = 3))]
    pub correct_option_index: usize,

    /// Why the correct option is right.
    #[validate(length(min = 1))]
    pub explanation: String,
}

impl TryFrom<GeneratedQuestion> for Question {
    type Error = AppError;

    fn try_from(generated: GeneratedQuestion) -> Result<Self, Self::Error> {
        Question::new(
            generated.question,
            generated.options,
            generated.correct_option_index,
            generated.explanation,
        )
    }
}
