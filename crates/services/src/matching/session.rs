use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use kotoba_core::generator::deal_cards;
use kotoba_core::model::{
    CardId, MatchCard, MatchMode, MatchSettings, PairId, TICK_MS, Vocabulary,
};
use kotoba_core::Timers;

use super::view::{CardState, CardView, LossReason, MatchSummary};
use crate::error::SessionError;
use crate::speech::{Lang, Pronouncer};

/// Points for every matched pair before the time bonus.
pub const PAIR_BASE_SCORE: u32 = 100;

/// Top-level screen of a matching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPage {
    Choose,
    Playing,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchTask {
    Tick,
    ConfirmMatch { round: u32, pair: PairId },
    ClearMismatch { round: u32 },
    DealRound { round: u32 },
    Speak { round: u32, source: usize },
}

impl MatchTask {
    /// Lower runs first among tasks due at the same instant.
    fn precedence(self) -> u8 {
        match self {
            MatchTask::Tick => 0,
            _ => 1,
        }
    }
}

/// `round(100 * clock / limit)`, in whole points.
#[must_use]
pub fn time_bonus(clock: u32, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let clock = u64::from(clock.min(limit));
    let limit = u64::from(limit);
    let bonus = (200 * clock + limit) / (2 * limit);
    u32::try_from(bonus).unwrap_or(u32::MAX)
}

/// Timed pairs-matching game played in consecutive rounds.
pub struct MatchSession {
    vocabulary: Vocabulary,
    settings: MatchSettings,
    rng: StdRng,
    pronouncer: Arc<dyn Pronouncer>,
    timers: Timers<MatchTask>,
    page: MatchPage,
    cards: Vec<MatchCard>,
    selected: Vec<CardId>,
    matched: BTreeSet<PairId>,
    confirming: Option<PairId>,
    flash: bool,
    clock: u32,
    score: u32,
    wrong: u32,
    round: u32,
    rounds_won: u32,
    loss: Option<LossReason>,
}

impl MatchSession {
    #[must_use]
    pub fn new(vocabulary: Vocabulary, pronouncer: Arc<dyn Pronouncer>) -> Self {
        let settings = MatchSettings::default();
        Self {
            vocabulary,
            clock: settings.time_limit_secs(),
            settings,
            rng: StdRng::from_os_rng(),
            pronouncer,
            timers: Timers::new(),
            page: MatchPage::Choose,
            cards: Vec::new(),
            selected: Vec::new(),
            matched: BTreeSet::new(),
            confirming: None,
            flash: false,
            score: 0,
            wrong: 0,
            round: 0,
            rounds_won: 0,
            loss: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: MatchSettings) -> Self {
        self.clock = settings.time_limit_secs();
        self.settings = settings;
        self
    }

    /// # Errors
    ///
    /// Returns `SessionError::Locked` unless the session is on the mode picker.
    pub fn set_mode(&mut self, mode: MatchMode) -> Result<(), SessionError> {
        self.ensure_choosing()?;
        self.settings = self.settings.clone().with_mode(mode);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Locked` outside the mode picker, or a settings
    /// error for a zero limit.
    pub fn set_time_limit(&mut self, secs: u32) -> Result<(), SessionError> {
        self.ensure_choosing()?;
        self.settings = self.settings.clone().with_time_limit(secs)?;
        self.clock = secs;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Locked` unless the session is on the mode picker.
    pub fn set_settings(&mut self, settings: MatchSettings) -> Result<(), SessionError> {
        self.ensure_choosing()?;
        self.clock = settings.time_limit_secs();
        self.settings = settings;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotEnoughVocabulary` when a full round cannot be dealt.
    pub fn ensure_startable(&self) -> Result<(), SessionError> {
        let required = self.pairs_per_round();
        let available = self.vocabulary.len();
        if available < required {
            return Err(SessionError::NotEnoughVocabulary {
                required,
                available,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn can_start(&self) -> bool {
        self.ensure_startable().is_ok()
    }

    /// Deals the first round. The score starts from zero.
    pub fn start(&mut self) -> bool {
        if self.page != MatchPage::Choose {
            return false;
        }
        if let Err(err) = self.ensure_startable() {
            warn!(%err, "matching start ignored");
            return false;
        }
        self.score = 0;
        self.rounds_won = 0;
        self.deal();
        true
    }

    /// Deals a fresh round from the summary screen, keeping the score.
    pub fn play_again(&mut self) -> bool {
        if self.page != MatchPage::Summary || !self.can_start() {
            return false;
        }
        self.deal();
        true
    }

    pub fn back_to_choose(&mut self) {
        self.timers.cancel_all();
        self.cards.clear();
        self.selected.clear();
        self.matched.clear();
        self.confirming = None;
        self.flash = false;
        self.clock = self.settings.time_limit_secs();
        self.score = 0;
        self.wrong = 0;
        self.rounds_won = 0;
        self.round = 0;
        self.loss = None;
        self.page = MatchPage::Choose;
        debug!("matching back to mode picker");
    }

    /// Selects a card. Returns `false` when the click is rejected.
    pub fn click(&mut self, id: CardId) -> bool {
        if self.page != MatchPage::Playing
            || self.flash
            || self.clock == 0
            || self.selected.len() >= 2
        {
            return false;
        }
        let Some(card) = self.cards.iter().find(|card| card.id() == id) else {
            return false;
        };
        let (pair, source) = (card.pair_id(), card.source());
        if self.matched.contains(&pair) || self.selected.contains(&id) {
            return false;
        }

        self.selected.push(id);
        let [first, _] = self.selected[..] else {
            trace!(card = %id, "matching first pick");
            return true;
        };
        if self.pair_of(first) == Some(pair) {
            self.on_match(pair, source);
        } else {
            self.on_mismatch();
        }
        true
    }

    /// Feeds elapsed time to the session. Among tasks due at the same instant
    /// the clock tick runs first, so a loss beats a same-instant success.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self
            .timers
            .now()
            .saturating_add(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        while let Some(mut batch) = self.timers.pop_next_batch(target) {
            batch.sort_by_key(|(_, task)| task.precedence());
            for (_, task) in batch {
                self.handle(task);
            }
        }
        self.timers.advance_to(target);
    }

    #[must_use]
    pub fn until_next_task(&self) -> Option<Duration> {
        self.timers.until_next().map(Duration::from_millis)
    }

    //
    // ─── READ SURFACE ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn page(&self) -> MatchPage {
        self.page
    }

    #[must_use]
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.settings.mode()
    }

    /// The dealt deck in display order, including matched cards.
    #[must_use]
    pub fn cards(&self) -> &[MatchCard] {
        &self.cards
    }

    #[must_use]
    pub fn card_state(&self, id: CardId) -> Option<CardState> {
        let card = self.cards.iter().find(|card| card.id() == id)?;
        Some(self.state_of(card))
    }

    #[must_use]
    pub fn card_views(&self) -> Vec<CardView> {
        self.cards
            .iter()
            .map(|card| CardView::new(card, self.state_of(card)))
            .collect()
    }

    /// 1-based number of the current round; 0 before the first deal.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn clock(&self) -> u32 {
        self.clock
    }

    #[must_use]
    pub fn clock_ratio(&self) -> f32 {
        let limit = self.settings.time_limit_secs();
        if limit == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.clock as f32 / limit as f32;
        ratio
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn lives_remaining(&self) -> u32 {
        self.settings.max_wrong().saturating_sub(self.wrong)
    }

    #[must_use]
    pub fn matched_pairs(&self) -> &BTreeSet<PairId> {
        &self.matched
    }

    #[must_use]
    pub fn loss_reason(&self) -> Option<LossReason> {
        self.loss
    }

    /// Rounds cleared since the session left the mode picker.
    #[must_use]
    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    #[must_use]
    pub fn summary(&self) -> Option<MatchSummary> {
        if self.page != MatchPage::Summary {
            return None;
        }
        Some(MatchSummary {
            score: self.score,
            loss_reason: self.loss?,
            rounds_won: self.rounds_won,
        })
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn ensure_choosing(&self) -> Result<(), SessionError> {
        if self.page == MatchPage::Choose {
            Ok(())
        } else {
            Err(SessionError::Locked)
        }
    }

    fn pairs_per_round(&self) -> usize {
        usize::try_from(self.settings.pairs_per_round()).unwrap_or(usize::MAX)
    }

    fn pair_of(&self, id: CardId) -> Option<PairId> {
        self.cards
            .iter()
            .find(|card| card.id() == id)
            .map(MatchCard::pair_id)
    }

    fn state_of(&self, card: &MatchCard) -> CardState {
        if self.matched.contains(&card.pair_id()) {
            CardState::Matched
        } else if !self.selected.contains(&card.id()) {
            CardState::Idle
        } else if self.flash {
            CardState::Wrong
        } else if self.confirming == Some(card.pair_id()) {
            CardState::Matching
        } else {
            CardState::Selected
        }
    }

    fn deal(&mut self) {
        self.timers.cancel_all();
        self.cards = deal_cards(
            &self.vocabulary,
            self.settings.mode(),
            self.pairs_per_round(),
            &mut self.rng,
        );
        self.selected.clear();
        self.matched.clear();
        self.confirming = None;
        self.flash = false;
        self.wrong = 0;
        self.loss = None;
        self.clock = self.settings.time_limit_secs();
        self.round += 1;
        self.timers.schedule_repeating(TICK_MS, MatchTask::Tick);
        self.page = MatchPage::Playing;
        debug!(
            round = self.round,
            cards = self.cards.len(),
            mode = self.settings.mode().label(),
            "matching round dealt"
        );
    }

    fn on_match(&mut self, pair: PairId, source: usize) {
        let gained = PAIR_BASE_SCORE + time_bonus(self.clock, self.settings.time_limit_secs());
        self.score = self.score.saturating_add(gained);
        self.confirming = Some(pair);
        let round = self.round;
        self.timers.schedule_once(
            self.settings.speak_delay_ms(),
            MatchTask::Speak { round, source },
        );
        self.timers.schedule_once(
            self.settings.match_confirm_ms(),
            MatchTask::ConfirmMatch { round, pair },
        );
        debug!(%pair, gained, score = self.score, "matching pair found");
    }

    fn on_mismatch(&mut self) {
        self.flash = true;
        self.wrong += 1;
        debug!(wrong = self.wrong, "matching mismatch");
        if self.wrong >= self.settings.max_wrong() {
            self.end(LossReason::Wrong);
            return;
        }
        let round = self.round;
        self.timers.schedule_once(
            self.settings.mismatch_clear_ms(),
            MatchTask::ClearMismatch { round },
        );
    }

    fn end(&mut self, reason: LossReason) {
        self.timers.cancel_all();
        self.loss = Some(reason);
        self.page = MatchPage::Summary;
        debug!(?reason, score = self.score, rounds_won = self.rounds_won, "matching ended");
    }

    fn handle(&mut self, task: MatchTask) {
        if self.page != MatchPage::Playing {
            return;
        }
        match task {
            MatchTask::Tick => {
                self.clock = self.clock.saturating_sub(1);
                trace!(clock = self.clock, "matching tick");
                if self.clock == 0 {
                    self.end(LossReason::Time);
                }
            }
            MatchTask::ConfirmMatch { round, pair } => {
                if round != self.round || self.confirming != Some(pair) {
                    return;
                }
                self.matched.insert(pair);
                self.selected.clear();
                self.confirming = None;
                if self.matched.len() * 2 == self.cards.len() {
                    self.rounds_won += 1;
                    debug!(round, rounds_won = self.rounds_won, "matching round won");
                    self.timers
                        .schedule_once(self.settings.deal_delay_ms(), MatchTask::DealRound { round });
                }
            }
            MatchTask::ClearMismatch { round } => {
                if round == self.round && self.flash {
                    self.flash = false;
                    self.selected.clear();
                }
            }
            MatchTask::DealRound { round } => {
                if round == self.round {
                    self.deal();
                }
            }
            MatchTask::Speak { round, source } => {
                if round != self.round {
                    return;
                }
                // Kana reads unambiguously whatever the stem shows.
                if let Some(entry) = self.vocabulary.get(source) {
                    self.pronouncer.speak(entry.hiragana(), Lang::Japanese);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::RecordingPronouncer;
    use kotoba_core::model::VocabularyEntry;

    fn vocab(size: usize) -> Vocabulary {
        [
            ("山", "やま", "yama", "mountain"),
            ("川", "かわ", "kawa", "river"),
            ("空", "そら", "sora", "sky"),
            ("海", "うみ", "umi", "sea"),
            ("花", "はな", "hana", "flower"),
            ("木", "き", "ki", "tree"),
            ("石", "いし", "ishi", "stone"),
        ]
        .into_iter()
        .take(size)
        .map(|(k, h, r, m)| VocabularyEntry::new(k, h, r, m))
        .collect()
    }

    fn started(recorder: &RecordingPronouncer) -> MatchSession {
        let mut game = MatchSession::new(vocab(6), Arc::new(recorder.clone())).with_seed(9);
        game.set_mode(MatchMode::KanjiHiragana).unwrap();
        assert!(game.start());
        game
    }

    fn stem(pair: u32) -> CardId {
        CardId::new(pair * 2)
    }

    fn other(pair: u32) -> CardId {
        CardId::new(pair * 2 + 1)
    }

    fn mismatch(game: &mut MatchSession) {
        assert!(game.click(stem(0)));
        assert!(game.click(stem(1)));
    }

    #[test]
    fn time_bonus_rounds_to_nearest() {
        assert_eq!(time_bonus(25, 30), 83);
        assert_eq!(time_bonus(30, 30), 100);
        assert_eq!(time_bonus(0, 30), 0);
        assert_eq!(time_bonus(1, 8), 13);
        assert_eq!(time_bonus(10, 20), 50);
    }

    #[test]
    fn start_requires_a_full_round_of_words() {
        let mut game = MatchSession::new(vocab(5), Arc::new(RecordingPronouncer::new()));
        assert_eq!(
            game.ensure_startable(),
            Err(SessionError::NotEnoughVocabulary {
                required: 6,
                available: 5
            })
        );
        assert!(!game.start());
        assert_eq!(game.page(), MatchPage::Choose);
        assert!(!game.click(stem(0)));
    }

    #[test]
    fn deal_lays_out_twelve_idle_cards() {
        let game = started(&RecordingPronouncer::new());
        assert_eq!(game.page(), MatchPage::Playing);
        assert_eq!(game.round(), 1);
        assert_eq!(game.cards().len(), 12);
        assert!(game.card_views().iter().all(|v| v.state == CardState::Idle));
        assert_eq!(game.clock(), 30);
        assert_eq!(game.lives_remaining(), 3);
    }

    #[test]
    fn selected_card_cannot_be_clicked_again() {
        let mut game = started(&RecordingPronouncer::new());
        assert!(game.click(stem(3)));
        assert!(!game.click(stem(3)));
        assert_eq!(game.card_state(stem(3)), Some(CardState::Selected));
        assert_eq!(game.wrong_count(), 0);
    }

    #[test]
    fn unknown_card_is_ignored() {
        let mut game = started(&RecordingPronouncer::new());
        assert!(!game.click(CardId::new(99)));
    }

    #[test]
    fn mismatch_flashes_then_clears() {
        let mut game = started(&RecordingPronouncer::new());
        mismatch(&mut game);
        assert_eq!(game.wrong_count(), 1);
        assert_eq!(game.card_state(stem(0)), Some(CardState::Wrong));
        assert!(!game.click(stem(2)), "input blocked during the flash");

        game.advance(Duration::from_millis(599));
        assert_eq!(game.card_state(stem(1)), Some(CardState::Wrong));
        game.advance(Duration::from_millis(1));
        assert_eq!(game.card_state(stem(1)), Some(CardState::Idle));
        assert!(game.click(stem(2)));
    }

    #[test]
    fn match_is_confirmed_after_a_short_delay() {
        let recorder = RecordingPronouncer::new();
        let mut game = started(&recorder);
        assert!(game.click(other(4)));
        assert!(game.click(stem(4)));
        assert_eq!(game.score(), 200);
        assert_eq!(game.card_state(stem(4)), Some(CardState::Matching));
        assert!(!game.click(stem(0)), "two cards already pending");

        game.advance(Duration::from_millis(200));
        let source = game.cards().iter().find(|c| c.id() == stem(4)).unwrap().source();
        assert_eq!(recorder.spoken(), vec![vocab(6)[source].hiragana()]);

        game.advance(Duration::from_millis(200));
        assert_eq!(game.card_state(other(4)), Some(CardState::Matched));
        assert!(game.matched_pairs().contains(&PairId::new(4)));
        assert!(!game.click(stem(4)));
        assert!(game.click(stem(0)));
    }

    #[test]
    fn third_mismatch_ends_with_wrong() {
        let mut game = started(&RecordingPronouncer::new());
        for _ in 0..2 {
            mismatch(&mut game);
            game.advance(Duration::from_millis(600));
        }
        assert_eq!(game.lives_remaining(), 1);
        mismatch(&mut game);
        assert_eq!(game.page(), MatchPage::Summary);
        assert_eq!(game.loss_reason(), Some(LossReason::Wrong));
        assert_eq!(game.lives_remaining(), 0);
        assert!(game.until_next_task().is_none());
    }

    #[test]
    fn wrong_budget_beats_the_clock_when_it_runs_out_first() {
        let mut game = started(&RecordingPronouncer::new());
        for _ in 0..2 {
            mismatch(&mut game);
            game.advance(Duration::from_millis(600));
        }
        game.advance(Duration::from_millis(28_799));
        assert_eq!(game.clock(), 1);

        mismatch(&mut game);
        game.advance(Duration::from_millis(1));
        assert_eq!(game.loss_reason(), Some(LossReason::Wrong));
        assert_eq!(game.clock(), 1);
    }

    #[test]
    fn expired_clock_beats_the_deciding_mismatch() {
        let mut game = started(&RecordingPronouncer::new());
        for _ in 0..2 {
            mismatch(&mut game);
            game.advance(Duration::from_millis(600));
        }
        game.advance(Duration::from_millis(28_800));
        assert_eq!(game.loss_reason(), Some(LossReason::Time));
        assert!(!game.click(stem(0)));
        assert_eq!(game.wrong_count(), 2);
    }

    #[test]
    fn time_expiry_beats_a_pending_match() {
        let mut game = started(&RecordingPronouncer::new());
        game.advance(Duration::from_millis(29_600));
        assert_eq!(game.clock(), 1);
        assert!(game.click(stem(2)));
        assert!(game.click(other(2)));

        game.advance(Duration::from_millis(400));
        assert_eq!(game.page(), MatchPage::Summary);
        assert_eq!(game.loss_reason(), Some(LossReason::Time));
        assert!(game.matched_pairs().is_empty());
        assert_eq!(game.score(), PAIR_BASE_SCORE + time_bonus(1, 30));
    }

    #[test]
    fn clearing_a_round_deals_the_next_one() {
        let mut game = started(&RecordingPronouncer::new());
        mismatch(&mut game);
        game.advance(Duration::from_millis(600));
        for pair in 0..6 {
            assert!(game.click(stem(pair)));
            assert!(game.click(other(pair)));
            game.advance(Duration::from_millis(400));
        }
        assert_eq!(game.matched_pairs().len(), 6);
        assert_eq!(game.rounds_won(), 1);
        assert_eq!(game.wrong_count(), 1);
        let score = game.score();

        game.advance(Duration::from_millis(1_200));
        assert_eq!(game.page(), MatchPage::Playing);
        assert_eq!(game.round(), 2);
        assert!(game.matched_pairs().is_empty());
        assert_eq!(game.wrong_count(), 0);
        assert_eq!(game.score(), score);
        assert_eq!(game.clock(), 30);
    }

    #[test]
    fn play_again_keeps_score_and_back_to_choose_resets_it() {
        let mut game = started(&RecordingPronouncer::new());
        game.click(stem(1));
        game.click(other(1));
        game.advance(Duration::from_secs(30));
        assert_eq!(game.loss_reason(), Some(LossReason::Time));
        let score = game.score();
        assert!(score > 0);
        assert_eq!(
            game.summary(),
            Some(MatchSummary {
                score,
                loss_reason: LossReason::Time,
                rounds_won: 0
            })
        );

        assert_eq!(game.set_time_limit(45), Err(SessionError::Locked));
        assert!(game.play_again());
        assert_eq!(game.score(), score);
        assert_eq!(game.loss_reason(), None);
        assert_eq!(game.round(), 2);

        game.back_to_choose();
        assert_eq!(game.score(), 0);
        assert!(game.cards().is_empty());
        assert_eq!(game.round(), 0);
        assert!(game.set_time_limit(45).is_ok());
        assert_eq!(game.clock(), 45);

        assert!(game.start());
        assert_eq!(game.round(), 1);
    }
}
