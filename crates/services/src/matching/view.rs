use serde::Serialize;

use kotoba_core::model::{CardId, CardSide, MatchCard, PairId};

/// Why a matching session left the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LossReason {
    /// The round clock reached zero.
    Time,
    /// The wrong-answer budget ran out.
    Wrong,
}

/// How a card should be drawn right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Idle,
    Selected,
    /// Part of a correct pair that has not been removed from the board yet.
    Matching,
    /// Part of a mismatched pair, flashed until the selection clears.
    Wrong,
    Matched,
}

/// Render-ready projection of one card.
///
/// Not a UI view-model: no styling, just the card and its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub pair_id: PairId,
    pub side: CardSide,
    pub content: String,
    pub state: CardState,
}

impl CardView {
    #[must_use]
    pub fn new(card: &MatchCard, state: CardState) -> Self {
        Self {
            id: card.id(),
            pair_id: card.pair_id(),
            side: card.side(),
            content: card.content().to_owned(),
            state,
        }
    }
}

/// What the summary screen shows after a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub score: u32,
    pub loss_reason: LossReason,
    pub rounds_won: u32,
}
