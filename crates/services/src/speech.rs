//! One-way pronunciation port.
//!
//! Sessions call a `Pronouncer` after specific transitions and never wait for
//! or inspect the result. Hosts without speech support plug in
//! [`SilentPronouncer`].

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Language hint passed along with the text to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Lang {
    Japanese,
}

impl Lang {
    /// BCP 47 tag understood by speech engines.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Lang::Japanese => "ja-JP",
        }
    }
}

pub trait Pronouncer: Send + Sync {
    /// Fire-and-forget. Implementations swallow their own failures.
    fn speak(&self, text: &str, lang: Lang);
}

/// Pronouncer for hosts without speech output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPronouncer;

impl Pronouncer for SilentPronouncer {
    fn speak(&self, _text: &str, _lang: Lang) {}
}

/// Keeps every utterance in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPronouncer {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingPronouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, oldest first.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .map(|spoken| spoken.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.clear();
        }
    }
}

impl Pronouncer for RecordingPronouncer {
    fn speak(&self, text: &str, lang: Lang) {
        tracing::trace!(text, lang = lang.tag(), "speak");
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_owned());
        }
    }
}
