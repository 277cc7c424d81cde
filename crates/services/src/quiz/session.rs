use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use kotoba_core::generator::generate_questions;
use kotoba_core::model::{
    Outcome, QuizMode, QuizQuestion, QuizSettings, TICK_MS, TimerId, UserAnswer, Vocabulary,
};
use kotoba_core::{Clock, Timers};

use super::summary::QuizSummary;
use crate::error::SessionError;
use crate::speech::{Lang, Pronouncer};

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Top-level screen of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPage {
    Choose,
    InProgress,
    Finished,
}

/// Sub-state of the current question while the quiz is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPhase {
    AwaitingAnswer,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizTask {
    Tick,
    Advance { index: usize },
    Replay { index: usize },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Multiple-choice quiz over a vocabulary list.
///
/// The session owns its question set, its countdown and every delayed task it
/// schedules. Hosts feed it user choices and elapsed time, then render the
/// read-only projections.
pub struct QuizSession {
    vocabulary: Vocabulary,
    mode: QuizMode,
    settings: QuizSettings,
    rng: StdRng,
    clock: Clock,
    pronouncer: Arc<dyn Pronouncer>,
    timers: Timers<QuizTask>,
    page: QuizPage,
    phase: QuestionPhase,
    questions: Vec<QuizQuestion>,
    current: usize,
    remaining_secs: Option<u32>,
    countdown: Option<TimerId>,
    pending_advance: Option<TimerId>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Creates a session on the mode picker with listening defaults.
    #[must_use]
    pub fn new(vocabulary: Vocabulary, pronouncer: Arc<dyn Pronouncer>) -> Self {
        Self {
            vocabulary,
            mode: QuizMode::default(),
            settings: QuizSettings::default(),
            rng: StdRng::from_os_rng(),
            clock: Clock::default(),
            pronouncer,
            timers: Timers::new(),
            page: QuizPage::Choose,
            phase: QuestionPhase::AwaitingAnswer,
            questions: Vec::new(),
            current: 0,
            remaining_secs: None,
            countdown: None,
            pending_advance: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Replace the random source with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: QuizMode) -> Self {
        self.mode = mode;
        self
    }

    /// # Errors
    ///
    /// Returns `SessionError::Locked` unless the session is on the mode picker.
    pub fn set_mode(&mut self, mode: QuizMode) -> Result<(), SessionError> {
        self.ensure_choosing()?;
        self.mode = mode;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Locked` unless the session is on the mode picker.
    pub fn set_settings(&mut self, settings: QuizSettings) -> Result<(), SessionError> {
        self.ensure_choosing()?;
        self.settings = settings;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::EmptyVocabulary` when there is nothing to ask.
    pub fn ensure_startable(&self) -> Result<(), SessionError> {
        if self.vocabulary.is_empty() {
            return Err(SessionError::EmptyVocabulary);
        }
        Ok(())
    }

    /// Whether the host should enable its start action.
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.ensure_startable().is_ok()
    }

    /// Leaves the mode picker and asks the first question.
    ///
    /// Returns `false` (and changes nothing) when not on the picker or when
    /// the vocabulary is empty.
    pub fn start(&mut self) -> bool {
        if self.page != QuizPage::Choose {
            return false;
        }
        if let Err(err) = self.ensure_startable() {
            warn!(%err, "quiz start ignored");
            return false;
        }
        self.begin();
        true
    }

    /// Regenerates the question set and starts over. Valid while in progress
    /// or on the summary.
    pub fn restart(&mut self) -> bool {
        if self.page == QuizPage::Choose || !self.can_start() {
            return false;
        }
        self.begin();
        true
    }

    /// Abandons the session and returns to the mode picker.
    pub fn back_to_choose(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;
        self.pending_advance = None;
        self.questions.clear();
        self.current = 0;
        self.remaining_secs = None;
        self.started_at = None;
        self.completed_at = None;
        self.page = QuizPage::Choose;
        debug!("quiz back to mode picker");
    }

    /// Answers the current question with a 1-based option position.
    ///
    /// Ignored unless a question is awaiting an answer and the position exists.
    pub fn select(&mut self, position: u8) -> bool {
        if self.page != QuizPage::InProgress || self.phase != QuestionPhase::AwaitingAnswer {
            return false;
        }
        let Some(question) = self.questions.get(self.current) else {
            return false;
        };
        if question.choice_text(position).is_none() {
            return false;
        }
        self.reveal(UserAnswer::Choice(position));
        true
    }

    /// Speaks the current stem again while it is still unanswered.
    pub fn replay_stem(&mut self) -> bool {
        if self.page != QuizPage::InProgress || self.phase != QuestionPhase::AwaitingAnswer {
            return false;
        }
        self.speak_current();
        true
    }

    /// Skips the rest of the reveal delay. Not available on the last question.
    pub fn next_now(&mut self) -> bool {
        if self.page != QuizPage::InProgress
            || self.phase != QuestionPhase::Revealed
            || self.is_last_question()
        {
            return false;
        }
        if let Some(id) = self.pending_advance.take() {
            self.timers.cancel(id);
        }
        self.move_next();
        true
    }

    /// Feeds elapsed time to the session, firing every task that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.timers.now().saturating_add(millis(elapsed));
        while let Some(batch) = self.timers.pop_next_batch(target) {
            for (id, task) in batch {
                self.handle(id, task);
            }
        }
        self.timers.advance_to(target);
    }

    /// Time until the next scheduled task, if any.
    #[must_use]
    pub fn until_next_task(&self) -> Option<Duration> {
        self.timers.until_next().map(Duration::from_millis)
    }

    //
    // ─── READ SURFACE ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn page(&self) -> QuizPage {
        self.page
    }

    #[must_use]
    pub fn phase(&self) -> QuestionPhase {
        self.phase
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.page != QuizPage::InProgress {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Seconds left on the countdown; `None` for untimed quizzes or off-question.
    #[must_use]
    pub fn clock(&self) -> Option<u32> {
        self.remaining_secs
    }

    /// Remaining share of the countdown in `[0, 1]`, for progress bars.
    #[must_use]
    pub fn clock_ratio(&self) -> f32 {
        match (self.remaining_secs, self.settings.question_time_secs()) {
            #[allow(clippy::cast_precision_loss)]
            (Some(left), Some(budget)) if budget > 0 => left as f32 / budget as f32,
            _ => 0.0,
        }
    }

    /// Long description of the current answer, shown after the reveal.
    #[must_use]
    pub fn correct_answer_detail(&self) -> Option<String> {
        let question = self.current_question()?;
        let entry = self.vocabulary.get(question.source())?;
        Some(entry.describe(self.mode.answer()))
    }

    /// Aggregate result, available once the quiz has finished.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        if self.page != QuizPage::Finished {
            return None;
        }
        let started_at = self.started_at?;
        let completed_at = self.completed_at?;
        Some(QuizSummary::from_questions(
            &self.questions,
            started_at,
            completed_at,
        ))
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn ensure_choosing(&self) -> Result<(), SessionError> {
        if self.page == QuizPage::Choose {
            Ok(())
        } else {
            Err(SessionError::Locked)
        }
    }

    fn begin(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;
        self.pending_advance = None;
        self.questions = generate_questions(&self.vocabulary, self.mode, &mut self.rng);
        self.current = 0;
        self.started_at = Some(self.clock.now());
        self.completed_at = None;
        self.page = QuizPage::InProgress;
        debug!(
            total = self.questions.len(),
            mode = %self.mode.label(),
            "quiz started"
        );
        self.present_current();
    }

    fn present_current(&mut self) {
        self.phase = QuestionPhase::AwaitingAnswer;
        self.remaining_secs = self.settings.question_time_secs();
        if self.remaining_secs.is_some() {
            self.countdown = Some(self.timers.schedule_repeating(TICK_MS, QuizTask::Tick));
        }
        if self.settings.speak_stems() {
            self.speak_current();
        }
    }

    fn reveal(&mut self, answer: UserAnswer) {
        if let Some(id) = self.countdown.take() {
            self.timers.cancel(id);
        }
        let index = self.current;
        let Some(question) = self.questions.get_mut(index) else {
            return;
        };
        let Some(outcome) = question.record(answer) else {
            return;
        };
        self.phase = QuestionPhase::Revealed;
        debug!(
            question = index + 1,
            answer = answer.position(),
            ?outcome,
            "quiz answer revealed"
        );

        if outcome == Outcome::Correct && self.settings.speak_stems() {
            self.timers
                .schedule_once(self.settings.replay_delay_ms(), QuizTask::Replay { index });
        }
        let delay = if self.is_last_question() {
            self.settings.final_reveal_delay_ms()
        } else {
            self.settings.reveal_delay_ms()
        };
        self.pending_advance = Some(self.timers.schedule_once(delay, QuizTask::Advance { index }));
    }

    fn move_next(&mut self) {
        if self.is_last_question() {
            self.finish();
            return;
        }
        self.current += 1;
        self.present_current();
    }

    fn finish(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;
        self.pending_advance = None;
        self.remaining_secs = None;
        self.completed_at = Some(self.clock.now());
        self.page = QuizPage::Finished;
        debug!(total = self.questions.len(), "quiz finished");
    }

    fn handle(&mut self, id: TimerId, task: QuizTask) {
        if self.page != QuizPage::InProgress {
            return;
        }
        match task {
            QuizTask::Tick => {
                if self.phase != QuestionPhase::AwaitingAnswer {
                    return;
                }
                let Some(left) = self.remaining_secs else {
                    return;
                };
                let left = left.saturating_sub(1);
                self.remaining_secs = Some(left);
                trace!(left, "quiz tick");
                if left == 0 {
                    self.reveal(UserAnswer::TimedOut);
                }
            }
            QuizTask::Advance { index } => {
                if self.pending_advance != Some(id)
                    || index != self.current
                    || self.phase != QuestionPhase::Revealed
                {
                    return;
                }
                self.pending_advance = None;
                self.move_next();
            }
            QuizTask::Replay { index } => {
                if index == self.current && self.phase == QuestionPhase::Revealed {
                    self.speak_current();
                }
            }
        }
    }

    fn speak_current(&self) {
        if let Some(question) = self.questions.get(self.current) {
            self.pronouncer.speak(question.stem(), Lang::Japanese);
        }
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
