use std::collections::HashSet;

use serde::Serialize;

use crate::errors::{AppError, AppResult};

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

const OPTION_LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

/// Display letter for an option index, `A` through `D`.
pub fn option_letter(index: usize) -> Option<char> {
    OPTION_LETTERS.get(index).copied()
}

/// A single multiple-choice question. Fields are only readable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt_text: String,
    options: Vec<String>,
    correct_option_index: usize,
    explanation: String,
}

impl Question {
    /// Builds a question, trimming text and rejecting anything that breaks the
    /// option count, uniqueness or index bounds.
    pub fn new(
        prompt_text: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
        explanation: impl Into<String>,
    ) -> AppResult<Self> {
        let prompt_text = prompt_text.into().trim().to_string();
        if prompt_text.is_empty() {
            return Err(AppError::ValidationError(
                "Question text must not be empty".to_string(),
            ));
        }

        if options.len() != OPTION_COUNT {
            return Err(AppError::ValidationError(format!(
                "Question '{}' has {} options, expected {}",
                prompt_text,
                options.len(),
                OPTION_COUNT
            )));
        }

        let options: Vec<String> = options.iter().map(|o| o.trim().to_string()).collect();
        if options.iter().any(|o| o.is_empty()) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' has an empty option",
                prompt_text
            )));
        }

        let mut seen = HashSet::new();
        if !options.iter().all(|o| seen.insert(o.to_lowercase())) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' has duplicate options",
                prompt_text
            )));
        }

        if correct_option_index >= OPTION_COUNT {
            return Err(AppError::ValidationError(format!(
                "Question '{}' marks option {} as correct, valid range is 0..{}",
                prompt_text, correct_option_index, OPTION_COUNT
            )));
        }

        let explanation = explanation.into().trim().to_string();
        if explanation.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Question '{}' has no explanation",
                prompt_text
            )));
        }

        Ok(Self {
            prompt_text,
            options,
            correct_option_index,
            explanation,
        })
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_option_index(&self) -> usize {
        self.correct_option_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_option_index]
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn is_valid_option(&self, index: usize) -> bool {
        index < self.options.len()
    }
}

/// A recorded choice for one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Answer {
    question_index: usize,
    selected_option_index: usize,
    is_correct: bool,
}

impl Answer {
    /// Caller guarantees `selected_option_index` is a valid option of `question`.
    pub(crate) fn grade(
        question_index: usize,
        question: &Question,
        selected_option_index: usize,
    ) -> Self {
        Self {
            question_index,
            selected_option_index,
            is_correct: selected_option_index == question.correct_option_index,
        }
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn selected_option_index(&self) -> usize {
        self.selected_option_index
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}
