use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

pub const MAX_TOPIC_LENGTH: usize = 200;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[validate(custom(function = "validate_topic"))]
    pub topic: String,

    // Falls back to the configured default when absent.
    #[validate(range(min = 1, max = 30))]
    pub question_count: Option<u16>,
}

/// Measures the topic after trimming, in characters.
fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    let length = topic.trim().chars().count();
    if length == 0 || length > MAX_TOPIC_LENGTH {
        return Err(ValidationError::new("topic_length").with_message(Cow::Owned(format!(
            "topic must be 1 to {} characters after trimming, got {}",
            MAX_TOPIC_LENGTH, length
        ))));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerRequest {
    // Signed so that negative indexes surface as out-of-range rather than a parse error.
    pub selected_option_index: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_valid_start_quiz_request() {
        let request = StartQuizRequest {
            topic: "Rust ownership".to_string(),
            question_count: Some(5),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_question_count_is_optional() {
        let request: StartQuizRequest = serde_json::from_str(r#"{"topic":"Math"}"#).unwrap();
        assert!(request.question_count.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_topic() {
        let request = StartQuizRequest {
            topic: String::new(),
            question_count: Some(3),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_topic_length_is_measured_after_trimming() {
        let padded = format!("{}Math{}", " ".repeat(150), " ".repeat(150));
        let request = StartQuizRequest {
            topic: padded,
            question_count: Some(3),
        };
        assert!(request.validate().is_ok());

        let blank = StartQuizRequest {
            topic: " \t ".to_string(),
            question_count: Some(3),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_topic_too_long() {
        let request = StartQuizRequest {
            topic: "x".repeat(MAX_TOPIC_LENGTH + 1),
            question_count: Some(3),
        };

        let message = request.validate().unwrap_err().to_string();
        assert!(message.contains("got 201"));
        assert!(!message.contains("xxxx"));
    }

    #[test]
    fn test_question_count_out_of_range() {
        for count in [0, 31] {
            let request = StartQuizRequest {
                topic: "Math".to_string(),
                question_count: Some(count),
            };
            assert!(request.validate().is_err(), "count {} should be rejected", count);
        }
    }

    #[test]
    fn test_submit_answer_accepts_negative_index() {
        let request: SubmitAnswerRequest =
            serde_json::from_str(r#"{"selected_option_index":-1}"#).unwrap();
        assert_eq!(request.selected_option_index, -1);
    }
}
