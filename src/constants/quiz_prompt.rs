use once_cell::sync::Lazy;

use crate::models::dto::generated::GeneratedQuiz;

pub const QUIZ_GENERATION_PROMPT: &str = "You are a quiz author writing multiple-choice questions for a learner.

Generate exactly {count} multiple-choice questions on the topic \"{topic}\".

### Rules:

1. Every question has exactly 4 answer options, all different from each other.
2. Exactly one option is correct. Give its zero-based position (0, 1, 2 or 3) in `correct_option_index`.
3. Vary the position of the correct option across questions.
4. Give a one or two sentence `explanation` of why the correct option is right.
5. Avoid \"All of the above\" and \"None of the above\" options.
6. Do not number the questions or prefix options with letters.

### Output:

Respond with a single JSON object and nothing else. It must match this JSON schema:

{schema}
";

static QUIZ_SCHEMA: Lazy<String> = Lazy::new(|| {
    serde_json::to_string_pretty(&schemars::schema_for!(GeneratedQuiz)).unwrap_or_default()
});

/// Renders the generation prompt. The same topic and count always give the same text.
pub fn build_quiz_prompt(topic: &str, count: usize) -> String {
    // Topic goes in last so user text is never re-scanned for placeholders.
    QUIZ_GENERATION_PROMPT
        .replace("{schema}", &QUIZ_SCHEMA)
        .replace("{count}", &count.to_string())
        .replace("{topic}", topic.trim())
}
