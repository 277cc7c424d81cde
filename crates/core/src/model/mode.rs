use serde::{Deserialize, Serialize};

use crate::model::vocab::VocabField;

/// Projection used to build quiz questions: which field is the stem and which
/// field the choices are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMode {
    stem: VocabField,
    answer: VocabField,
}

impl QuizMode {
    /// Reading drills, in the order the mode picker lists them.
    pub const READING: [QuizMode; 6] = [
        QuizMode::new(VocabField::Meaning, VocabField::Kanji),
        QuizMode::new(VocabField::Meaning, VocabField::Hiragana),
        QuizMode::new(VocabField::Kanji, VocabField::Hiragana),
        QuizMode::new(VocabField::Kanji, VocabField::Meaning),
        QuizMode::new(VocabField::Hiragana, VocabField::Kanji),
        QuizMode::new(VocabField::Hiragana, VocabField::Meaning),
    ];

    /// Listening drills. The stem is always the reading, which is spoken.
    pub const LISTENING: [QuizMode; 3] = [
        QuizMode::new(VocabField::Hiragana, VocabField::Kanji),
        QuizMode::new(VocabField::Hiragana, VocabField::Meaning),
        QuizMode::new(VocabField::Hiragana, VocabField::Hiragana),
    ];

    #[must_use]
    pub const fn new(stem: VocabField, answer: VocabField) -> Self {
        Self { stem, answer }
    }

    #[must_use]
    pub fn stem(&self) -> VocabField {
        self.stem
    }

    #[must_use]
    pub fn answer(&self) -> VocabField {
        self.answer
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{} → {}", self.stem, self.answer)
    }
}

impl Default for QuizMode {
    fn default() -> Self {
        Self::LISTENING[0]
    }
}

/// Field pairing used to deal matching cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    HiraganaMeaning,
    KanjiMeaning,
    KanjiHiragana,
}

impl MatchMode {
    pub const ALL: [MatchMode; 3] = [
        MatchMode::HiraganaMeaning,
        MatchMode::KanjiMeaning,
        MatchMode::KanjiHiragana,
    ];

    #[must_use]
    pub fn stem_field(self) -> VocabField {
        match self {
            MatchMode::HiraganaMeaning => VocabField::Hiragana,
            MatchMode::KanjiMeaning | MatchMode::KanjiHiragana => VocabField::Kanji,
        }
    }

    #[must_use]
    pub fn pair_field(self) -> VocabField {
        match self {
            MatchMode::HiraganaMeaning | MatchMode::KanjiMeaning => VocabField::Meaning,
            MatchMode::KanjiHiragana => VocabField::Hiragana,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MatchMode::HiraganaMeaning => "Hiragana - Meaning",
            MatchMode::KanjiMeaning => "Kanji - Meaning",
            MatchMode::KanjiHiragana => "Kanji - Hiragana",
        }
    }
}
