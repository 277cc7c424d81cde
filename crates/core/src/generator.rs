//! Builds quiz question sets and matching decks from a vocabulary list.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{
    CardId, CardSide, MatchCard, MatchMode, PairId, QuizMode, QuizQuestion, Vocabulary,
};
use crate::random::{sample_distinct, shuffle};

/// Number of wrong options placed next to the correct one.
pub const DISTRACTORS: usize = 3;

/// Generates one question per vocabulary entry, in random order.
///
/// Distractors come from entries whose answer value differs from the correct
/// one, deduplicated by value, so every option is distinct. Small or repetitive
/// lists yield fewer than four options rather than an error.
pub fn generate_questions<R: Rng + ?Sized>(
    vocabulary: &Vocabulary,
    mode: QuizMode,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let indices: Vec<usize> = (0..vocabulary.len()).collect();
    let order = shuffle(&indices, rng);
    let answer_field = mode.answer();

    order
        .iter()
        .enumerate()
        .map(|(i, &source)| {
            let entry = &vocabulary[source];
            let correct = entry.field(answer_field);

            let mut seen = HashSet::new();
            let pool: Vec<&str> = order
                .iter()
                .map(|&other| vocabulary[other].field(answer_field))
                .filter(|value| *value != correct && seen.insert(*value))
                .collect();

            let mut choices: Vec<String> = sample_distinct(&pool, DISTRACTORS, rng)
                .into_iter()
                .map(str::to_owned)
                .collect();
            let slot = rng.random_range(0..=choices.len());
            choices.insert(slot, correct.to_owned());

            QuizQuestion::new(
                i + 1,
                source,
                entry.field(mode.stem()).to_owned(),
                correct.to_owned(),
                choices,
                u8::try_from(slot + 1).unwrap_or(u8::MAX),
            )
        })
        .collect()
}

/// Deals a shuffled deck of `pairs` stem/pair card couples from distinct entries.
///
/// Card ids are unique within the deck; pair ids run from 0 in selection order.
pub fn deal_cards<R: Rng + ?Sized>(
    vocabulary: &Vocabulary,
    mode: MatchMode,
    pairs: usize,
    rng: &mut R,
) -> Vec<MatchCard> {
    let indices: Vec<usize> = (0..vocabulary.len()).collect();
    let picked = sample_distinct(&indices, pairs, rng);

    let mut cards = Vec::with_capacity(picked.len() * 2);
    for (pair, source) in (0_u32..).zip(picked) {
        let entry = &vocabulary[source];
        let pair_id = PairId::new(pair);
        cards.push(MatchCard::new(
            CardId::new(pair * 2),
            pair_id,
            CardSide::Stem,
            entry.field(mode.stem_field()).to_owned(),
            source,
        ));
        cards.push(MatchCard::new(
            CardId::new(pair * 2 + 1),
            pair_id,
            CardSide::Pair,
            entry.field(mode.pair_field()).to_owned(),
            source,
        ));
    }
    cards.shuffle(rng);
    cards
}
