use chrono::{DateTime, Utc};
use serde::Serialize;

use kotoba_core::model::{Outcome, QuizQuestion};

/// One line of the post-quiz review table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub number: usize,
    pub stem: String,
    /// Text of the picked option; `None` when the question timed out.
    pub chosen: Option<String>,
    pub correct_answer: String,
    pub outcome: Outcome,
}

/// Aggregate result of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub total: usize,
    pub correct_count: usize,
    /// Percentage of correct answers, rounded to the nearest integer.
    pub accuracy: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub rows: Vec<ReviewRow>,
}

impl QuizSummary {
    #[must_use]
    pub fn from_questions(
        questions: &[QuizQuestion],
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let rows: Vec<ReviewRow> = questions
            .iter()
            .map(|q| ReviewRow {
                number: q.number(),
                stem: q.stem().to_owned(),
                chosen: q.user_choice_text().map(str::to_owned),
                correct_answer: q.correct_answer().to_owned(),
                outcome: q.outcome().unwrap_or(Outcome::Incorrect),
            })
            .collect();
        let correct_count = rows
            .iter()
            .filter(|row| row.outcome == Outcome::Correct)
            .count();

        Self {
            total: rows.len(),
            correct_count,
            accuracy: accuracy_percent(correct_count, rows.len()),
            started_at,
            completed_at,
            rows,
        }
    }
}

/// `round(100 * correct / total)`, or 0 for an empty quiz.
#[must_use]
pub fn accuracy_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = ((correct as f64 * 100.0) / total as f64).round() as u32;
    percent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_rounds_half_up() {
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 8), 13);
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(5, 5), 100);
    }

    #[test]
    fn review_rows_serialize_for_hosts() {
        let row = ReviewRow {
            number: 1,
            stem: "ねこ".into(),
            chosen: None,
            correct_answer: "cat".into(),
            outcome: Outcome::Incorrect,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["outcome"], "incorrect");
        assert!(json["chosen"].is_null());
    }
}
