//! Shared error types for the services crate.

use thiserror::Error;

use kotoba_core::model::SettingsError;

/// Errors emitted by session configuration commands.
///
/// Gameplay events (answers, clicks, elapsed time) never fail; they are either
/// applied or ignored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("vocabulary list is empty")]
    EmptyVocabulary,
    #[error("need at least {required} words to deal a round, have {available}")]
    NotEnoughVocabulary { required: usize, available: usize },
    #[error("settings can only change while choosing a mode")]
    Locked,
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
