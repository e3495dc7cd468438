#[cfg(test)]
pub mod fixtures {
    use serde_json::json;

    use crate::models::domain::Question;

    /// Question with four distinct options and the given correct index
    pub fn question_with_answer(prompt: &str, correct_option_index: usize) -> Question {
        Question::new(
            prompt,
            vec![
                format!("{} option A", prompt),
                format!("{} option B", prompt),
                format!("{} option C", prompt),
                format!("{} option D", prompt),
            ],
            correct_option_index,
            format!("Explanation for {}", prompt),
        )
        .expect("fixture question should be valid")
    }

    /// `count` math questions whose correct option is always index 1
    pub fn math_questions(count: usize) -> Vec<Question> {
        (1..=count)
            .map(|i| question_with_answer(&format!("Math question {}", i), 1))
            .collect()
    }

    /// Model reply with `count` questions sharing one correct index
    pub fn quiz_json(count: usize, correct_option_index: usize) -> String {
        let questions: Vec<_> = (1..=count)
            .map(|i| {
                json!({
                    "question": format!("Math question {}", i),
                    "options": [
                        format!("{} apples", i),
                        format!("{} pears", i),
                        format!("{} plums", i),
                        format!("{} figs", i)
                    ],
                    "correct_option_index": correct_option_index,
                    "explanation": format!("Because of rule {}", i)
                })
            })
            .collect();

        json!({ "questions": questions }).to_string()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_math_questions() {
        let questions = math_questions(3);
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.correct_option_index() == 1));
        assert_ne!(questions[0], questions[1]);
    }

    #[test]
    fn test_fixtures_quiz_json_parses() {
        let raw = quiz_json(2, 3);
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["questions"].as_array().unwrap().len(), 2);
        assert_eq!(value["questions"][1]["correct_option_index"], 3);
    }
}
