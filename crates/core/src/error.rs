use thiserror::Error;

use crate::model::{SettingsError, VocabularyError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
}
