use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{QuizSession, SessionState},
        dto::{
            request::{StartQuizRequest, SubmitAnswerRequest},
            response::{
                AnswerFeedbackDto, DiscardSessionResponse, QuestionDto, ReportDto, SessionDto,
            },
        },
    },
    services::quiz_generator::QuizGenerator,
};

struct StoredSession {
    session: QuizSession,
    last_touched: Instant,
}

impl StoredSession {
    fn new(session: QuizSession, now: Instant) -> Self {
        Self {
            session,
            last_touched: now,
        }
    }

    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_touched) > ttl
    }
}

/// Owns every live quiz session, keyed by session id.
///
/// A session left alone for longer than the TTL counts as abandoned. It is
/// invisible to lookups and is dropped the next time a quiz starts.
pub struct QuizService {
    generator: QuizGenerator,
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    default_question_count: u16,
    session_ttl: Duration,
}

impl QuizService {
    pub fn new(
        generator: QuizGenerator,
        default_question_count: u16,
        session_ttl: Duration,
    ) -> Self {
        Self {
            generator,
            sessions: RwLock::new(HashMap::new()),
            default_question_count,
            session_ttl,
        }
    }

    /// Generates questions and starts a session. Nothing is stored when generation fails.
    pub async fn start_quiz(&self, request: StartQuizRequest) -> AppResult<SessionDto> {
        request.validate()?;

        let topic = request.topic.trim();
        let count = request
            .question_count
            .unwrap_or(self.default_question_count) as usize;

        let mut session = QuizSession::new(topic);
        let questions = self.generator.generate(topic, count).await?;
        session.start(questions)?;

        let dto = SessionDto::from(&session);
        log::info!(
            "Started quiz session {} on '{}' with {} questions",
            session.id(),
            topic,
            count
        );

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        drop_idle_sessions(&mut sessions, now, self.session_ttl);
        sessions.insert(session.id(), StoredSession::new(session, now));

        Ok(dto)
    }

    pub async fn get_session(&self, id: &Uuid) -> AppResult<SessionDto> {
        let sessions = self.sessions.read().await;
        let session = self.live_session(&sessions, id)?;
        Ok(SessionDto::from(session))
    }

    pub async fn current_question(&self, id: &Uuid) -> AppResult<QuestionDto> {
        let sessions = self.sessions.read().await;
        let session = self.live_session(&sessions, id)?;
        let question = session.current_question()?;
        Ok(QuestionDto::new(question, session.current_index(), session.total()))
    }

    pub async fn submit_answer(
        &self,
        id: &Uuid,
        request: SubmitAnswerRequest,
    ) -> AppResult<AnswerFeedbackDto> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(id)
            .filter(|stored| !stored.is_idle(now, self.session_ttl))
            .ok_or_else(|| session_not_found(id))?;
        stored.last_touched = now;
        let session = &mut stored.session;

        let answer = match usize::try_from(request.selected_option_index) {
            Ok(selected) => session.submit_answer(selected)?,
            Err(_) => {
                // State errors take precedence over a bad index.
                session.current_question()?;
                return Err(AppError::OutOfRange(format!(
                    "Option {} does not exist; option indexes start at 0",
                    request.selected_option_index
                )));
            }
        };

        if session.state() == SessionState::Finished {
            log::info!(
                "Quiz session {} finished with score {}/{}",
                id,
                session.score(),
                session.total()
            );
        }

        Ok(AnswerFeedbackDto::new(session, &answer))
    }

    pub async fn report(&self, id: &Uuid) -> AppResult<ReportDto> {
        let sessions = self.sessions.read().await;
        let session = self.live_session(&sessions, id)?;
        let report = session.report()?;
        Ok(ReportDto::new(session.id(), &report))
    }

    /// Drops a session so the player can start over.
    pub async fn discard(&self, id: &Uuid) -> AppResult<DiscardSessionResponse> {
        self.sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| session_not_found(id))?;

        log::info!("Discarded quiz session {}", id);
        Ok(DiscardSessionResponse {
            session_id: *id,
            message: "Quiz session discarded".to_string(),
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn live_session<'a>(
        &self,
        sessions: &'a HashMap<Uuid, StoredSession>,
        id: &Uuid,
    ) -> AppResult<&'a QuizSession> {
        sessions
            .get(id)
            .filter(|stored| !stored.is_idle(Instant::now(), self.session_ttl))
            .map(|stored| &stored.session)
            .ok_or_else(|| session_not_found(id))
    }
}

fn drop_idle_sessions(sessions: &mut HashMap<Uuid, StoredSession>, now: Instant, ttl: Duration) {
    let before = sessions.len();
    sessions.retain(|_, stored| !stored.is_idle(now, ttl));

    let dropped = before - sessions.len();
    if dropped > 0 {
        log::info!("Dropped {} idle quiz sessions", dropped);
    }
}

fn session_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Quiz session '{}' not found", id))
}
