use serde::{Deserialize, Serialize};

/// Result of a single quiz question once it has been answered or timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// What the user did with a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAnswer {
    /// 1-based position of the chosen option.
    Choice(u8),
    /// The countdown ran out before any option was picked.
    TimedOut,
}

impl UserAnswer {
    /// Position form used by hosts: the chosen position, or `0` on timeout.
    #[must_use]
    pub fn position(self) -> u8 {
        match self {
            UserAnswer::Choice(position) => position,
            UserAnswer::TimedOut => 0,
        }
    }
}

/// One multiple-choice question derived from a vocabulary entry.
///
/// Choices are fixed at creation. The answer is recorded at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    number: usize,
    source: usize,
    stem: String,
    correct_answer: String,
    choices: Vec<String>,
    correct_position: u8,
    user_answer: Option<UserAnswer>,
    outcome: Option<Outcome>,
}

impl QuizQuestion {
    pub(crate) fn new(
        number: usize,
        source: usize,
        stem: String,
        correct_answer: String,
        choices: Vec<String>,
        correct_position: u8,
    ) -> Self {
        debug_assert_eq!(
            choices.get(usize::from(correct_position).saturating_sub(1)),
            Some(&correct_answer)
        );
        Self {
            number,
            source,
            stem,
            correct_answer,
            choices,
            correct_position,
            user_answer: None,
            outcome: None,
        }
    }

    /// 1-based number of the question within its set.
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Index of the vocabulary entry this question was built from.
    #[must_use]
    pub fn source(&self) -> usize {
        self.source
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn correct_position(&self) -> u8 {
        self.correct_position
    }

    #[must_use]
    pub fn user_answer(&self) -> Option<UserAnswer> {
        self.user_answer
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.outcome.is_some()
    }

    /// Text of the option at a 1-based position.
    #[must_use]
    pub fn choice_text(&self, position: u8) -> Option<&str> {
        let index = usize::from(position).checked_sub(1)?;
        self.choices.get(index).map(String::as_str)
    }

    /// Text of the option the user picked; `None` when unanswered or timed out.
    #[must_use]
    pub fn user_choice_text(&self) -> Option<&str> {
        match self.user_answer? {
            UserAnswer::Choice(position) => self.choice_text(position),
            UserAnswer::TimedOut => None,
        }
    }

    /// Records the user's answer and returns the resulting outcome.
    ///
    /// Returns `None` without touching the question if it was already answered.
    pub fn record(&mut self, answer: UserAnswer) -> Option<Outcome> {
        if self.is_answered() {
            return None;
        }
        let outcome = match answer {
            UserAnswer::Choice(position) if position == self.correct_position => Outcome::Correct,
            _ => Outcome::Incorrect,
        };
        self.user_answer = Some(answer);
        self.outcome = Some(outcome);
        Some(outcome)
    }
}
