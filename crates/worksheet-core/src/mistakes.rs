//! Mistake records derived from a grading pass.

use serde::{Deserialize, Serialize};

use crate::grading::GradeOutcome;
use crate::model::{AnswerKey, Exercise, ExerciseItem, Selection, SelectionState};

/// Rendering of an item the learner left blank.
pub const NO_ANSWER: &str = "(empty)";

/// One incorrectly answered item, as reported to the coach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeRecord {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub context: String,
}

/// Collect a record for every item graded `false`, in dataset order.
///
/// `context` is the fixed topic string supplied by the caller.
pub fn collect_mistakes(
    exercise: &Exercise,
    selections: &SelectionState,
    outcome: &GradeOutcome,
    context: &str,
) -> Vec<MistakeRecord> {
    exercise
        .items
        .iter()
        .filter(|item| outcome.is_correct(item.id) == Some(false))
        .map(|item| MistakeRecord {
            question: item.question(),
            user_answer: render_selection(exercise, item, selections.get(&item.id)),
            correct_answer: render_key(exercise, item),
            context: context.to_string(),
        })
        .collect()
}

fn render_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

fn render_choice(exercise: &Exercise, item: &ExerciseItem, id: &str) -> String {
    exercise
        .find_choice(item, id)
        .map(|c| c.display())
        .unwrap_or_else(|| id.to_string())
}

/// Human-readable rendering of what the learner picked or typed.
pub fn render_selection(
    exercise: &Exercise,
    item: &ExerciseItem,
    selection: Option<&Selection>,
) -> String {
    match selection {
        None => NO_ANSWER.to_string(),
        Some(Selection::Bool(value)) => render_bool(*value),
        Some(Selection::Choice(id)) => render_choice(exercise, item, id),
        Some(Selection::Text(text)) if text.trim().is_empty() => NO_ANSWER.to_string(),
        Some(Selection::Text(text)) => text.clone(),
    }
}

/// Human-readable rendering of an item's answer key.
pub fn render_key(exercise: &Exercise, item: &ExerciseItem) -> String {
    match &item.answer {
        AnswerKey::Bool(value) => render_bool(*value),
        AnswerKey::Choice(id) => render_choice(exercise, item, id),
        AnswerKey::Text(text) => text.clone(),
    }
}
