#![forbid(unsafe_code)]

pub mod driver;
pub mod error;
pub mod matching;
pub mod quiz;
pub mod speech;

pub use kotoba_core::Clock;

pub use driver::{SessionDriver, TimedSession};
pub use error::SessionError;
pub use matching::{CardState, CardView, LossReason, MatchPage, MatchSession, MatchSummary};
pub use quiz::{QuestionPhase, QuizPage, QuizSession, QuizSummary, ReviewRow};
pub use speech::{Lang, Pronouncer, RecordingPronouncer, SilentPronouncer};
