mod common;

use std::sync::Arc;
use std::time::Duration;

use kotoba_core::model::{Outcome, QuizMode, QuizSettings, UserAnswer, VocabField};
use kotoba_core::time::fixed_now;
use proptest::prelude::*;
use services::quiz::accuracy_percent;
use services::{
    Clock, QuestionPhase, QuizPage, QuizSession, RecordingPronouncer, SilentPronouncer,
};

use common::{init_tracing, words};

const REVEAL: Duration = Duration::from_millis(3_400);
const FINAL_REVEAL: Duration = Duration::from_millis(4_400);
const QUESTION_TIME: Duration = Duration::from_secs(10);

#[test]
fn unanswered_questions_time_out_as_incorrect() {
    init_tracing();
    let mut quiz = QuizSession::new(words(3), Arc::new(SilentPronouncer))
        .with_seed(3)
        .with_clock(Clock::fixed(fixed_now()));
    quiz.set_mode(QuizMode::new(VocabField::Hiragana, VocabField::Meaning))
        .unwrap();
    assert!(quiz.start());

    for index in 0..3 {
        assert_eq!(quiz.current_index(), index);
        quiz.advance(QUESTION_TIME);
        let question = quiz.current_question().unwrap();
        assert_eq!(question.user_answer().map(UserAnswer::position), Some(0));
        assert_eq!(question.outcome(), Some(Outcome::Incorrect));
        quiz.advance(if index == 2 { FINAL_REVEAL } else { REVEAL });
    }

    assert_eq!(quiz.page(), QuizPage::Finished);
    let summary = quiz.summary().unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.correct_count, 0);
    assert_eq!(summary.accuracy, 0);
    assert!(summary.rows.iter().all(|row| row.chosen.is_none()));
    assert_eq!(summary.started_at, fixed_now());
    assert_eq!(summary.completed_at, fixed_now());
}

#[test]
fn listening_quiz_speaks_each_new_stem() {
    init_tracing();
    let recorder = RecordingPronouncer::new();
    let mut quiz = QuizSession::new(words(4), Arc::new(recorder.clone())).with_seed(17);
    quiz.start();

    let mut expected = Vec::new();
    while quiz.page() == QuizPage::InProgress {
        let question = quiz.current_question().unwrap().clone();
        expected.push(question.stem().to_owned());
        assert!(quiz.replay_stem());
        expected.push(question.stem().to_owned());

        quiz.select(question.correct_position());
        assert!(!quiz.replay_stem(), "no manual replay once revealed");
        quiz.advance(Duration::from_millis(600));
        expected.push(question.stem().to_owned());
        quiz.advance(FINAL_REVEAL);
    }

    assert_eq!(recorder.spoken(), expected);
    assert_eq!(quiz.summary().unwrap().accuracy, 100);
}

#[test]
fn review_rows_carry_the_chosen_text() {
    init_tracing();
    let mut quiz = QuizSession::new(words(5), Arc::new(SilentPronouncer)).with_seed(21);
    quiz.set_settings(QuizSettings::reading()).unwrap();
    quiz.set_mode(QuizMode::READING[2]).unwrap();
    quiz.start();

    let mut picks = Vec::new();
    while quiz.page() == QuizPage::InProgress {
        let question = quiz.current_question().unwrap();
        let position = if question.number() % 2 == 0 {
            question.correct_position()
        } else {
            (question.correct_position() % 4) + 1
        };
        picks.push(question.choice_text(position).unwrap().to_owned());
        assert!(quiz.select(position));
        if !quiz.next_now() {
            quiz.advance(Duration::from_secs(3));
        }
    }

    let summary = quiz.summary().unwrap();
    assert_eq!(summary.correct_count, 2);
    assert_eq!(summary.accuracy, 40);
    let chosen: Vec<String> = summary.rows.iter().filter_map(|row| row.chosen.clone()).collect();
    assert_eq!(chosen, picks);
    for row in &summary.rows {
        let expected = if row.number % 2 == 0 {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        assert_eq!(row.outcome, expected);
    }
}

fn layout(quiz: &QuizSession) -> Vec<(usize, Vec<String>)> {
    quiz.questions()
        .iter()
        .map(|q| (q.source(), q.choices().to_vec()))
        .collect()
}

#[test]
fn restart_from_summary_starts_a_fresh_run() {
    init_tracing();
    let mut quiz = QuizSession::new(words(8), Arc::new(SilentPronouncer))
        .with_seed(5)
        .with_settings(QuizSettings::reading());
    quiz.start();
    let first_round = layout(&quiz);
    while quiz.page() == QuizPage::InProgress {
        let position = quiz.current_question().unwrap().correct_position();
        quiz.select(position);
        quiz.advance(Duration::from_secs(3));
    }

    assert!(quiz.restart());
    assert_eq!(quiz.page(), QuizPage::InProgress);
    assert_eq!(quiz.phase(), QuestionPhase::AwaitingAnswer);
    let second_round = layout(&quiz);
    assert_eq!(second_round.len(), first_round.len());
    assert_ne!(second_round, first_round);
    assert!(quiz.questions().iter().all(|q| !q.is_answered()));
    assert!(quiz.summary().is_none());
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Pick(u8),
    Wait,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![(1u8..=4).prop_map(Action::Pick), Just(Action::Wait)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn summary_counts_exactly_the_correct_picks(
        seed in any::<u64>(),
        size in 1usize..=8,
        actions in prop::collection::vec(action(), 8),
    ) {
        let mut quiz = QuizSession::new(words(size), Arc::new(SilentPronouncer)).with_seed(seed);
        prop_assert!(quiz.start());

        let mut expected = 0;
        for step in actions.iter().take(size) {
            let question = quiz.current_question().unwrap().clone();
            let picked = match *step {
                Action::Pick(position) => quiz.select(position).then_some(position),
                Action::Wait => None,
            };
            if picked.is_none() {
                quiz.advance(QUESTION_TIME);
                prop_assert_eq!(quiz.current_question().unwrap().user_answer(), Some(UserAnswer::TimedOut));
            }
            if picked == Some(question.correct_position()) {
                expected += 1;
            }
            quiz.advance(FINAL_REVEAL);
        }

        prop_assert_eq!(quiz.page(), QuizPage::Finished);
        let summary = quiz.summary().unwrap();
        prop_assert_eq!(summary.total, size);
        prop_assert_eq!(summary.correct_count, expected);
        prop_assert_eq!(summary.accuracy, accuracy_percent(expected, size));
    }
}
