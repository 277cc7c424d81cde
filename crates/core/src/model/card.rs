use serde::{Deserialize, Serialize};

use crate::model::ids::{CardId, PairId};

/// Which half of a vocabulary pair a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    Stem,
    Pair,
}

/// One face-up card of the matching game.
///
/// The two cards dealt from the same entry share a `pair_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCard {
    id: CardId,
    pair_id: PairId,
    side: CardSide,
    content: String,
    source: usize,
}

impl MatchCard {
    #[must_use]
    pub fn new(id: CardId, pair_id: PairId, side: CardSide, content: String, source: usize) -> Self {
        Self {
            id,
            pair_id,
            side,
            content,
            source,
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn pair_id(&self) -> PairId {
        self.pair_id
    }

    #[must_use]
    pub fn side(&self) -> CardSide {
        self.side
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Index of the vocabulary entry this card was dealt from.
    #[must_use]
    pub fn source(&self) -> usize {
        self.source
    }
}
