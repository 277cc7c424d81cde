#![allow(dead_code)]

use std::sync::Once;

use kotoba_core::model::{Vocabulary, VocabularyEntry};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Routes session logs through the test harness. `RUST_LOG=services=trace`
/// shows every tick.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn words(count: usize) -> Vocabulary {
    [
        ("学生", "がくせい", "gakusei", "student"),
        ("会社", "かいしゃ", "kaisha", "company"),
        ("電車", "でんしゃ", "densha", "train"),
        ("時計", "とけい", "tokei", "clock"),
        ("天気", "てんき", "tenki", "weather"),
        ("友達", "ともだち", "tomodachi", "friend"),
        ("図書館", "としょかん", "toshokan", "library"),
        ("病院", "びょういん", "byouin", "hospital"),
    ]
    .into_iter()
    .take(count)
    .map(|(k, h, r, m)| VocabularyEntry::new(k, h, r, m))
    .collect()
}
