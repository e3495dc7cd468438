use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::domain::{
    question::option_letter, Answer, Performance, Question, QuizReport, QuizSession, SessionState,
};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDto {
    pub index: usize,
    pub letter: String,
    pub text: String,
}

fn option_dtos(question: &Question) -> Vec<OptionDto> {
    question
        .options()
        .iter()
        .enumerate()
        .map(|(index, text)| OptionDto {
            index,
            letter: letter(index),
            text: text.clone(),
        })
        .collect()
}

fn letter(index: usize) -> String {
    option_letter(index).map(String::from).unwrap_or_default()
}

/// A question as the player sees it, without the answer.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub question_number: usize,
    pub total_questions: usize,
    pub prompt: String,
    pub options: Vec<OptionDto>,
}

impl QuestionDto {
    pub fn new(question: &Question, index: usize, total_questions: usize) -> Self {
        Self {
            question_number: index + 1,
            total_questions,
            prompt: question.prompt_text().to_string(),
            options: option_dtos(question),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub session_id: Uuid,
    pub topic: String,
    pub state: SessionState,
    pub current_index: usize,
    pub total_questions: usize,
    pub score: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionDto>,
}

impl From<&QuizSession> for SessionDto {
    fn from(session: &QuizSession) -> Self {
        SessionDto {
            session_id: session.id(),
            topic: session.topic().to_string(),
            state: session.state(),
            current_index: session.current_index(),
            total_questions: session.total(),
            score: session.score(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            current_question: session
                .current_question()
                .ok()
                .map(|q| QuestionDto::new(q, session.current_index(), session.total())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerFeedbackDto {
    pub session_id: Uuid,
    pub question_number: usize,
    pub selected_option_index: usize,
    pub is_correct: bool,
    pub score: usize,
    pub answered: usize,
    pub total_questions: usize,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionDto>,
}

impl AnswerFeedbackDto {
    pub fn new(session: &QuizSession, answer: &Answer) -> Self {
        Self {
            session_id: session.id(),
            question_number: answer.question_index() + 1,
            selected_option_index: answer.selected_option_index(),
            is_correct: answer.is_correct(),
            score: session.score(),
            answered: session.current_index(),
            total_questions: session.total(),
            state: session.state(),
            next_question: session
                .current_question()
                .ok()
                .map(|q| QuestionDto::new(q, session.current_index(), session.total())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewItemDto {
    pub question_number: usize,
    pub prompt: String,
    pub options: Vec<OptionDto>,
    pub selected_option_index: usize,
    pub selected_letter: String,
    pub correct_option_index: usize,
    pub correct_letter: String,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDto {
    pub session_id: Uuid,
    pub topic: String,
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub elapsed_seconds: f64,
    pub performance: Performance,
    pub message: String,
    pub reward_badge: bool,
    pub review: Vec<ReviewItemDto>,
}

impl ReportDto {
    pub fn new(session_id: Uuid, report: &QuizReport) -> Self {
        let performance = report.performance();
        let review = report
            .review
            .iter()
            .map(|entry| {
                let question = &entry.question;
                let answer = &entry.answer;
                ReviewItemDto {
                    question_number: answer.question_index() + 1,
                    prompt: question.prompt_text().to_string(),
                    options: option_dtos(question),
                    selected_option_index: answer.selected_option_index(),
                    selected_letter: letter(answer.selected_option_index()),
                    correct_option_index: question.correct_option_index(),
                    correct_letter: letter(question.correct_option_index()),
                    is_correct: answer.is_correct(),
                    explanation: question.explanation().to_string(),
                }
            })
            .collect();

        Self {
            session_id,
            topic: report.topic.clone(),
            score: report.score,
            total: report.total,
            percentage: report.percentage(),
            elapsed_seconds: report.elapsed_seconds(),
            performance,
            message: performance.message().to_string(),
            reward_badge: performance.earns_badge(),
            review,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscardSessionResponse {
    pub session_id: Uuid,
    pub message: String,
}
