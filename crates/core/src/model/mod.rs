mod card;
mod ids;
mod mode;
mod question;
mod settings;
mod vocab;

pub use card::{CardSide, MatchCard};
pub use ids::{CardId, PairId, TimerId};
pub use mode::{MatchMode, QuizMode};
pub use question::{Outcome, QuizQuestion, UserAnswer};
pub use settings::{
    MatchSettings, MatchSettingsDraft, QuizSettings, QuizSettingsDraft, SettingsError,
    TICK_MS, TIME_LIMIT_OPTIONS,
};
pub use vocab::{VocabField, Vocabulary, VocabularyEntry, VocabularyError};
