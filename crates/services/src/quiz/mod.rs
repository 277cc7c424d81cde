//! Multiple-choice quiz: question set, countdown, reveal and summary.

mod session;
mod summary;

pub use session::{QuestionPhase, QuizPage, QuizSession};
pub use summary::{QuizSummary, ReviewRow, accuracy_percent};
