//! The grading engine.
//!
//! A grading pass compares every item of an exercise against the learner's
//! current selections. It is total, pure and idempotent: missing or
//! mismatched selections grade as incorrect and nothing ever fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, Exercise, ExerciseItem, GradingRule, ItemId, Selection, SelectionState};
use crate::normalize::matches_free_text;

/// Result of one grading pass over an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeOutcome {
    /// Correctness of every item, keyed by item id.
    pub results: BTreeMap<ItemId, bool>,
    /// Number of `true` results.
    pub correct: usize,
}

impl GradeOutcome {
    /// Number of graded items (always the exercise length).
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// `correct / total`, or 0.0 for an empty pass.
    pub fn score(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.correct as f64 / self.results.len() as f64
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.correct == self.results.len()
    }

    pub fn is_correct(&self, id: ItemId) -> Option<bool> {
        self.results.get(&id).copied()
    }
}

/// Grade every item of `exercise` against `selections`.
pub fn grade(exercise: &Exercise, selections: &SelectionState) -> GradeOutcome {
    let results: BTreeMap<ItemId, bool> = exercise
        .items
        .iter()
        .map(|item| (item.id, is_correct(exercise.rule, item, selections.get(&item.id))))
        .collect();
    let correct = results.values().filter(|ok| **ok).count();

    tracing::debug!(
        exercise = %exercise.id,
        correct,
        total = results.len(),
        answered = selections.len(),
        "graded exercise"
    );

    GradeOutcome { results, correct }
}

/// Compare one selection with one item's key under `rule`.
pub fn is_correct(rule: GradingRule, item: &ExerciseItem, selection: Option<&Selection>) -> bool {
    match (rule, &item.answer, selection) {
        (GradingRule::TrueFalse, AnswerKey::Bool(key), Some(Selection::Bool(value))) => {
            value == key
        }
        (
            GradingRule::SingleChoice | GradingRule::PickList,
            AnswerKey::Choice(key),
            Some(Selection::Choice(value)),
        ) => value == key,
        (GradingRule::FreeText { expand_contractions }, AnswerKey::Text(key), selection) => {
            let input = match selection {
                Some(Selection::Text(text)) => text.as_str(),
                _ => "",
            };
            matches_free_text(input, key, expand_contractions)
        }
        _ => false,
    }
}
