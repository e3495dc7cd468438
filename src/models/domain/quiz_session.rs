use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::question::{Answer, Question};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

// Timestamps live inside the phase so `ended_at` cannot exist outside Finished.
#[derive(Clone, Debug)]
enum Phase {
    NotStarted,
    InProgress {
        started_at: DateTime<Utc>,
    },
    Finished {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
}

/// One attempt at a quiz. The current position and the score are derived from
/// the recorded answers.
#[derive(Clone, Debug)]
pub struct QuizSession {
    id: Uuid,
    topic: String,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    phase: Phase,
}

impl QuizSession {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            questions: Vec::new(),
            answers: Vec::new(),
            phase: Phase::NotStarted,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.answers.len()
    }

    pub fn score(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct()).count()
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::NotStarted => SessionState::NotStarted,
            Phase::InProgress { .. } => SessionState::InProgress,
            Phase::Finished { .. } => SessionState::Finished,
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::InProgress { started_at } | Phase::Finished { started_at, .. } => {
                Some(started_at)
            }
        }
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::Finished { ended_at, .. } => Some(ended_at),
            _ => None,
        }
    }

    pub fn start(&mut self, questions: Vec<Question>) -> AppResult<()> {
        self.start_at(questions, Utc::now())
    }

    fn start_at(&mut self, questions: Vec<Question>, now: DateTime<Utc>) -> AppResult<()> {
        if !matches!(self.phase, Phase::NotStarted) {
            return Err(AppError::InvalidState(format!(
                "Quiz {} has already been started",
                self.id
            )));
        }

        if questions.is_empty() {
            return Err(AppError::ValidationError(
                "A quiz needs at least one question".to_string(),
            ));
        }

        self.questions = questions;
        self.answers.clear();
        self.phase = Phase::InProgress { started_at: now };
        Ok(())
    }

    pub fn current_question(&self) -> AppResult<&Question> {
        match self.phase {
            Phase::InProgress { .. } => Ok(&self.questions[self.current_index()]),
            _ => Err(self.not_in_progress()),
        }
    }

    /// Records the choice for the current question and advances. The session
    /// finishes when the last question is answered.
    pub fn submit_answer(&mut self, selected_option_index: usize) -> AppResult<Answer> {
        self.submit_answer_at(selected_option_index, Utc::now())
    }

    fn submit_answer_at(
        &mut self,
        selected_option_index: usize,
        now: DateTime<Utc>,
    ) -> AppResult<Answer> {
        let started_at = match self.phase {
            Phase::InProgress { started_at } => started_at,
            _ => return Err(self.not_in_progress()),
        };

        let question_index = self.current_index();
        let question = &self.questions[question_index];
        if !question.is_valid_option(selected_option_index) {
            return Err(AppError::OutOfRange(format!(
                "Option {} does not exist for question {}; choose 0 to {}",
                selected_option_index,
                question_index + 1,
                question.options().len() - 1
            )));
        }

        let answer = Answer::grade(question_index, question, selected_option_index);
        self.answers.push(answer.clone());

        if self.answers.len() == self.questions.len() {
            self.phase = Phase::Finished {
                started_at,
                ended_at: now,
            };
        }

        Ok(answer)
    }

    pub fn report(&self) -> AppResult<QuizReport> {
        let (started_at, ended_at) = match self.phase {
            Phase::Finished {
                started_at,
                ended_at,
            } => (started_at, ended_at),
            _ => {
                return Err(AppError::InvalidState(format!(
                    "Quiz {} is not finished yet",
                    self.id
                )))
            }
        };

        let review = self
            .questions
            .iter()
            .cloned()
            .zip(self.answers.iter().cloned())
            .map(|(question, answer)| ReviewEntry { question, answer })
            .collect();

        Ok(QuizReport {
            topic: self.topic.clone(),
            score: self.score(),
            total: self.total(),
            elapsed: (ended_at - started_at).max(Duration::zero()),
            review,
        })
    }

    fn not_in_progress(&self) -> AppError {
        let reason = match self.state() {
            SessionState::NotStarted => "has not been started",
            SessionState::Finished => "is already finished",
            SessionState::InProgress => "is in progress",
        };
        AppError::InvalidState(format!("Quiz {} {}", self.id, reason))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewEntry {
    pub question: Question,
    pub answer: Answer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    /// More than half correct; earns the reward badge.
    Excellent,
    /// Exactly half correct.
    Good,
    KeepLearning,
}

impl Performance {
    pub fn from_score(score: usize, total: usize) -> Self {
        match (score * 2).cmp(&total) {
            std::cmp::Ordering::Greater => Performance::Excellent,
            std::cmp::Ordering::Equal => Performance::Good,
            std::cmp::Ordering::Less => Performance::KeepLearning,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Performance::Excellent => "Excellent! You earned a reward badge!",
            Performance::Good => "Good job! Try again for a reward!",
            Performance::KeepLearning => "Keep learning! You can do better next time.",
        }
    }

    pub fn earns_badge(&self) -> bool {
        matches!(self, Performance::Excellent)
    }
}

/// Summary of a finished session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizReport {
    pub topic: String,
    pub score: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub review: Vec<ReviewEntry>,
}

impl QuizReport {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 * 100.0 / self.total as f64
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.num_milliseconds() as f64 / 1000.0
    }

    pub fn performance(&self) -> Performance {
        Performance::from_score(self.score, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{math_questions, question_with_answer};

    fn started_session(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new("Math");
        session.start(questions).expect("start should succeed");
        session
    }

    #[test]
    fn new_session_is_not_started() {
        let session = QuizSession::new("Math");

        assert_eq!(session.state(), SessionState::NotStarted);
        assert_eq!(session.current_index(), 0);
        assert!(session.questions().is_empty());
        assert!(session.started_at().is_none());
        assert!(session.ended_at().is_none());
    }

    #[test]
    fn start_moves_to_in_progress() {
        let session = started_session(math_questions(3));

        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.total(), 3);
        assert!(session.started_at().is_some());
        assert!(session.ended_at().is_none());
    }

    #[test]
    fn start_twice_is_invalid_state() {
        let mut session = started_session(math_questions(2));

        let result = session.start(math_questions(2));

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(session.total(), 2);
    }

    #[test]
    fn start_without_questions_is_rejected() {
        let mut session = QuizSession::new("Math");

        assert!(session.start(Vec::new()).is_err());
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[test]
    fn math_scenario_scores_two_of_three() {
        let mut session = started_session(math_questions(3));

        for selected in [1, 0, 1] {
            session.submit_answer(selected).expect("answer should be accepted");
        }

        assert_eq!(session.state(), SessionState::Finished);
        let report = session.report().expect("report should be available");
        assert_eq!(report.score, 2);
        assert_eq!(report.total, 3);
        assert_eq!(report.review.len(), 3);

        for (i, entry) in report.review.iter().enumerate() {
            assert_eq!(entry.question, session.questions()[i]);
            assert_eq!(entry.answer.question_index(), i);
        }
        assert!(!report.review[1].answer.is_correct());
        assert_eq!(report.performance(), Performance::Excellent);
    }

    #[test]
    fn n_answers_finish_an_n_question_session() {
        for n in 1..=5 {
            let mut session = started_session(math_questions(n));
            for i in 0..n {
                assert_eq!(session.state(), SessionState::InProgress);
                assert_eq!(session.current_index(), i);
                session.submit_answer(i % 4).unwrap();
                assert_eq!(session.answers().len(), session.current_index());
            }

            assert_eq!(session.state(), SessionState::Finished);
            assert_eq!(session.answers().len(), n);
            assert!(session.ended_at().is_some());
        }
    }

    #[test]
    fn score_counts_matching_selections() {
        let questions = vec![
            question_with_answer("Q1", 0),
            question_with_answer("Q2", 3),
            question_with_answer("Q3", 2),
            question_with_answer("Q4", 1),
        ];
        let mut session = started_session(questions);

        for selected in [0, 3, 1, 0] {
            session.submit_answer(selected).unwrap();
        }

        assert_eq!(session.score(), 2);
        assert_eq!(session.report().unwrap().score, 2);
    }

    #[test]
    fn submit_before_start_is_invalid_state() {
        let mut session = QuizSession::new("Math");

        let result = session.submit_answer(0);

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert!(session.answers().is_empty());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn submit_after_finish_does_not_mutate() {
        let mut session = started_session(math_questions(1));
        session.submit_answer(1).unwrap();
        let ended_at = session.ended_at();

        let result = session.submit_answer(1);

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.score(), 1);
        assert_eq!(session.ended_at(), ended_at);
    }

    #[test]
    fn out_of_range_selection_does_not_mutate() {
        let mut session = started_session(math_questions(2));

        let result = session.submit_answer(4);

        assert!(matches!(result, Err(AppError::OutOfRange(_))));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn current_question_follows_position() {
        let mut session = started_session(math_questions(2));
        let first = session.current_question().unwrap().clone();

        session.submit_answer(0).unwrap();

        let second = session.current_question().unwrap();
        assert_ne!(&first, second);
        assert_eq!(second, &session.questions()[1]);
    }

    #[test]
    fn current_question_outside_progress_is_invalid_state() {
        let mut session = QuizSession::new("Math");
        assert!(matches!(
            session.current_question(),
            Err(AppError::InvalidState(_))
        ));

        session.start(math_questions(1)).unwrap();
        session.submit_answer(0).unwrap();
        assert!(matches!(
            session.current_question(),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn report_before_finish_is_invalid_state() {
        let mut session = QuizSession::new("Math");
        assert!(session.report().is_err());

        session.start(math_questions(2)).unwrap();
        session.submit_answer(1).unwrap();
        assert!(matches!(session.report(), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn elapsed_is_the_time_between_start_and_last_answer() {
        let started = Utc::now();
        let mut session = QuizSession::new("Math");
        session.start_at(math_questions(2), started).unwrap();
        session
            .submit_answer_at(1, started + Duration::seconds(4))
            .unwrap();
        session
            .submit_answer_at(1, started + Duration::milliseconds(12_500))
            .unwrap();

        let report = session.report().unwrap();

        assert_eq!(report.elapsed, Duration::milliseconds(12_500));
        assert_eq!(report.elapsed_seconds(), 12.5);
    }

    #[test]
    fn elapsed_is_never_negative() {
        let started = Utc::now();
        let mut session = QuizSession::new("Math");
        session.start_at(math_questions(1), started).unwrap();
        session
            .submit_answer_at(1, started - Duration::seconds(1))
            .unwrap();

        assert_eq!(session.report().unwrap().elapsed, Duration::zero());
    }

    #[test]
    fn elapsed_with_real_clock_is_non_negative() {
        let mut session = started_session(math_questions(1));
        session.submit_answer(0).unwrap();

        assert!(session.report().unwrap().elapsed >= Duration::zero());
    }

    #[test]
    fn performance_tiers_split_at_half() {
        assert_eq!(Performance::from_score(3, 4), Performance::Excellent);
        assert_eq!(Performance::from_score(2, 4), Performance::Good);
        assert_eq!(Performance::from_score(1, 4), Performance::KeepLearning);
        assert_eq!(Performance::from_score(1, 3), Performance::KeepLearning);
        assert!(Performance::Excellent.earns_badge());
        assert!(!Performance::Good.earns_badge());
    }

    #[test]
    fn percentage_uses_total() {
        let mut session = started_session(math_questions(4));
        for selected in [1, 1, 1, 0] {
            session.submit_answer(selected).unwrap();
        }

        assert_eq!(session.report().unwrap().percentage(), 75.0);
    }
}
