use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabularyError {
    #[error("{field} cannot be empty")]
    EmptyField { field: VocabField },
}

//
// ─── FIELDS ────────────────────────────────────────────────────────────────────
//

/// One of the four columns of a vocabulary entry.
///
/// Quiz and matching modes are projections over these fields: one field is
/// shown as the stem, another is asked for as the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabField {
    Kanji,
    Hiragana,
    Romaji,
    Meaning,
}

impl VocabField {
    pub const ALL: [VocabField; 4] = [
        VocabField::Kanji,
        VocabField::Hiragana,
        VocabField::Romaji,
        VocabField::Meaning,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VocabField::Kanji => "Kanji",
            VocabField::Hiragana => "Hiragana",
            VocabField::Romaji => "Romaji",
            VocabField::Meaning => "Meaning",
        }
    }
}

impl fmt::Display for VocabField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// A single word from the user-supplied list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabularyEntry {
    kanji: String,
    hiragana: String,
    romaji: String,
    meaning: String,
}

impl VocabularyEntry {
    /// Builds an entry from already-parsed fields.
    ///
    /// The engine assumes every field is non-empty and does not check it here;
    /// use [`VocabularyEntry::try_new`] when the input has not been validated.
    #[must_use]
    pub fn new(
        kanji: impl Into<String>,
        hiragana: impl Into<String>,
        romaji: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            kanji: kanji.into(),
            hiragana: hiragana.into(),
            romaji: romaji.into(),
            meaning: meaning.into(),
        }
    }

    /// Builds an entry, trimming each field and rejecting empty ones.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::EmptyField` naming the first blank field.
    pub fn try_new(
        kanji: &str,
        hiragana: &str,
        romaji: &str,
        meaning: &str,
    ) -> Result<Self, VocabularyError> {
        let entry = Self::new(kanji.trim(), hiragana.trim(), romaji.trim(), meaning.trim());
        if let Some(field) = VocabField::ALL
            .into_iter()
            .find(|field| entry.field(*field).is_empty())
        {
            return Err(VocabularyError::EmptyField { field });
        }
        Ok(entry)
    }

    #[must_use]
    pub fn kanji(&self) -> &str {
        &self.kanji
    }

    #[must_use]
    pub fn hiragana(&self) -> &str {
        &self.hiragana
    }

    #[must_use]
    pub fn romaji(&self) -> &str {
        &self.romaji
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    /// Projects the entry onto one field.
    #[must_use]
    pub fn field(&self, field: VocabField) -> &str {
        match field {
            VocabField::Kanji => &self.kanji,
            VocabField::Hiragana => &self.hiragana,
            VocabField::Romaji => &self.romaji,
            VocabField::Meaning => &self.meaning,
        }
    }

    /// Long form of the entry, led by `field`, as shown on the reveal panel.
    #[must_use]
    pub fn describe(&self, field: VocabField) -> String {
        match field {
            VocabField::Kanji => format!("{} ({}) : {}", self.kanji, self.hiragana, self.meaning),
            VocabField::Hiragana => {
                format!("{} ({}) : {}", self.hiragana, self.kanji, self.meaning)
            }
            VocabField::Romaji => format!("{} ({}) : {}", self.romaji, self.hiragana, self.meaning),
            VocabField::Meaning => format!("{} ({} / {})", self.meaning, self.kanji, self.hiragana),
        }
    }
}

//
// ─── VOCABULARY ────────────────────────────────────────────────────────────────
//

/// Read-only word list shared between a session and the questions or cards
/// derived from it.
///
/// Cloning is cheap; derived records refer back to entries by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    entries: Arc<[VocabularyEntry]>,
}

impl Vocabulary {
    #[must_use]
    pub fn new(entries: Vec<VocabularyEntry>) -> Self {
        Self {
            entries: Arc::from(entries),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&VocabularyEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.entries.iter()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<VocabularyEntry>> for Vocabulary {
    fn from(entries: Vec<VocabularyEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<VocabularyEntry> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = VocabularyEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for Vocabulary {
    type Output = VocabularyEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}
