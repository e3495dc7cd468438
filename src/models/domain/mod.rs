pub mod question;
pub mod quiz_session;
pub use question::{Answer, Question};
pub use quiz_session::{Performance, QuizReport, QuizSession, ReviewEntry, SessionState};
