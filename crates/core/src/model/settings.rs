use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::mode::MatchMode;

/// Length of one countdown tick, in milliseconds. Clocks count whole ticks.
pub const TICK_MS: u64 = 1_000;

/// Per-round time limits offered by the matching mode picker, in seconds.
pub const TIME_LIMIT_OPTIONS: [u32; 4] = [20, 30, 45, 60];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question time must be > 0 when the quiz is timed")]
    ZeroQuestionTime,

    #[error("final reveal delay must be >= the regular reveal delay")]
    FinalRevealTooShort,

    #[error("round time limit must be > 0")]
    ZeroTimeLimit,

    #[error("pairs per round must be > 0")]
    ZeroPairs,

    #[error("wrong answer budget must be > 0")]
    ZeroWrongBudget,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Timing and speech behaviour of a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizSettingsDraft", into = "QuizSettingsDraft")]
pub struct QuizSettings {
    question_time_secs: Option<u32>,
    reveal_delay_ms: u64,
    final_reveal_delay_ms: u64,
    replay_delay_ms: u64,
    speak_stems: bool,
}

/// Unvalidated quiz settings, as loaded from host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettingsDraft {
    pub question_time_secs: Option<u32>,
    pub reveal_delay_ms: u64,
    pub final_reveal_delay_ms: u64,
    pub replay_delay_ms: u64,
    pub speak_stems: bool,
}

impl QuizSettingsDraft {
    /// # Errors
    ///
    /// Returns `SettingsError` if the countdown is zero or the final reveal
    /// delay is shorter than the regular one.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        if self.question_time_secs == Some(0) {
            return Err(SettingsError::ZeroQuestionTime);
        }
        if self.final_reveal_delay_ms < self.reveal_delay_ms {
            return Err(SettingsError::FinalRevealTooShort);
        }
        Ok(QuizSettings {
            question_time_secs: self.question_time_secs,
            reveal_delay_ms: self.reveal_delay_ms,
            final_reveal_delay_ms: self.final_reveal_delay_ms,
            replay_delay_ms: self.replay_delay_ms,
            speak_stems: self.speak_stems,
        })
    }
}

impl QuizSettings {
    /// Timed drill where the stem is spoken:
    /// - 10 seconds per question
    /// - 3.4 s reveal, 4.4 s on the last question
    /// - stem replayed 600 ms after a correct answer
    #[must_use]
    pub fn listening() -> Self {
        Self {
            question_time_secs: Some(10),
            reveal_delay_ms: 3_400,
            final_reveal_delay_ms: 4_400,
            replay_delay_ms: 600,
            speak_stems: true,
        }
    }

    /// Untimed, silent drill with a 2 s reveal (3 s on the last question).
    #[must_use]
    pub fn reading() -> Self {
        Self {
            question_time_secs: None,
            reveal_delay_ms: 2_000,
            final_reveal_delay_ms: 3_000,
            replay_delay_ms: 600,
            speak_stems: false,
        }
    }

    /// Seconds allowed per question; `None` means no countdown.
    #[must_use]
    pub fn question_time_secs(&self) -> Option<u32> {
        self.question_time_secs
    }

    #[must_use]
    pub fn reveal_delay_ms(&self) -> u64 {
        self.reveal_delay_ms
    }

    #[must_use]
    pub fn final_reveal_delay_ms(&self) -> u64 {
        self.final_reveal_delay_ms
    }

    #[must_use]
    pub fn replay_delay_ms(&self) -> u64 {
        self.replay_delay_ms
    }

    #[must_use]
    pub fn speak_stems(&self) -> bool {
        self.speak_stems
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::listening()
    }
}

impl TryFrom<QuizSettingsDraft> for QuizSettings {
    type Error = SettingsError;

    fn try_from(draft: QuizSettingsDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<QuizSettings> for QuizSettingsDraft {
    fn from(settings: QuizSettings) -> Self {
        Self {
            question_time_secs: settings.question_time_secs,
            reveal_delay_ms: settings.reveal_delay_ms,
            final_reveal_delay_ms: settings.final_reveal_delay_ms,
            replay_delay_ms: settings.replay_delay_ms,
            speak_stems: settings.speak_stems,
        }
    }
}

//
// ─── MATCHING ──────────────────────────────────────────────────────────────────
//

/// Rules and pacing of the matching game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatchSettingsDraft", into = "MatchSettingsDraft")]
pub struct MatchSettings {
    mode: MatchMode,
    time_limit_secs: u32,
    pairs_per_round: u32,
    max_wrong: u32,
    match_confirm_ms: u64,
    mismatch_clear_ms: u64,
    speak_delay_ms: u64,
    deal_delay_ms: u64,
}

/// Unvalidated matching settings, as loaded from host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettingsDraft {
    pub mode: MatchMode,
    pub time_limit_secs: u32,
    pub pairs_per_round: u32,
    pub max_wrong: u32,
    pub match_confirm_ms: u64,
    pub mismatch_clear_ms: u64,
    pub speak_delay_ms: u64,
    pub deal_delay_ms: u64,
}

impl MatchSettingsDraft {
    /// # Errors
    ///
    /// Returns `SettingsError` if the time limit, pair count or wrong budget is zero.
    pub fn validate(self) -> Result<MatchSettings, SettingsError> {
        if self.time_limit_secs == 0 {
            return Err(SettingsError::ZeroTimeLimit);
        }
        if self.pairs_per_round == 0 {
            return Err(SettingsError::ZeroPairs);
        }
        if self.max_wrong == 0 {
            return Err(SettingsError::ZeroWrongBudget);
        }
        Ok(MatchSettings {
            mode: self.mode,
            time_limit_secs: self.time_limit_secs,
            pairs_per_round: self.pairs_per_round,
            max_wrong: self.max_wrong,
            match_confirm_ms: self.match_confirm_ms,
            mismatch_clear_ms: self.mismatch_clear_ms,
            speak_delay_ms: self.speak_delay_ms,
            deal_delay_ms: self.deal_delay_ms,
        })
    }
}

impl MatchSettings {
    #[must_use]
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// # Errors
    ///
    /// Returns `SettingsError::ZeroTimeLimit` if `secs` is zero.
    pub fn with_time_limit(mut self, secs: u32) -> Result<Self, SettingsError> {
        if secs == 0 {
            return Err(SettingsError::ZeroTimeLimit);
        }
        self.time_limit_secs = secs;
        Ok(self)
    }

    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn pairs_per_round(&self) -> u32 {
        self.pairs_per_round
    }

    #[must_use]
    pub fn max_wrong(&self) -> u32 {
        self.max_wrong
    }

    #[must_use]
    pub fn match_confirm_ms(&self) -> u64 {
        self.match_confirm_ms
    }

    #[must_use]
    pub fn mismatch_clear_ms(&self) -> u64 {
        self.mismatch_clear_ms
    }

    #[must_use]
    pub fn speak_delay_ms(&self) -> u64 {
        self.speak_delay_ms
    }

    #[must_use]
    pub fn deal_delay_ms(&self) -> u64 {
        self.deal_delay_ms
    }
}

impl Default for MatchSettings {
    /// Six pairs per round, 30 seconds, three wrong answers allowed.
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            time_limit_secs: 30,
            pairs_per_round: 6,
            max_wrong: 3,
            match_confirm_ms: 400,
            mismatch_clear_ms: 600,
            speak_delay_ms: 200,
            deal_delay_ms: 1_200,
        }
    }
}

impl TryFrom<MatchSettingsDraft> for MatchSettings {
    type Error = SettingsError;

    fn try_from(draft: MatchSettingsDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<MatchSettings> for MatchSettingsDraft {
    fn from(settings: MatchSettings) -> Self {
        Self {
            mode: settings.mode,
            time_limit_secs: settings.time_limit_secs,
            pairs_per_round: settings.pairs_per_round,
            max_wrong: settings.max_wrong,
            match_confirm_ms: settings.match_confirm_ms,
            mismatch_clear_ms: settings.mismatch_clear_ms,
            speak_delay_ms: settings.speak_delay_ms,
            deal_delay_ms: settings.deal_delay_ms,
        }
    }
}
