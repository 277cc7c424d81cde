//! Timed pairs-matching game.

mod session;
mod view;

pub use session::{MatchPage, MatchSession, PAIR_BASE_SCORE, time_bonus};
pub use view::{CardState, CardView, LossReason, MatchSummary};
