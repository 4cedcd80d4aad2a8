//! Worksheet report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::GradeOutcome;
use crate::mistakes::{render_key, render_selection, MistakeRecord};
use crate::model::{Exercise, ItemId, SelectionState};
use crate::traits::FeedbackResponse;

/// A graded worksheet: one entry per checked exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Exercises in the order they were checked.
    pub exercises: Vec<ExerciseReport>,
}

/// The outcome of checking one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseReport {
    pub exercise_id: String,
    pub title: String,
    pub correct: usize,
    pub total: usize,
    /// Every item in dataset order.
    pub items: Vec<ItemReport>,
    pub mistakes: Vec<MistakeRecord>,
    /// Coach feedback, when it was requested and arrived.
    #[serde(default)]
    pub feedback: Option<FeedbackResponse>,
    /// Learner-facing coach error, when the request failed.
    #[serde(default)]
    pub feedback_error: Option<String>,
}

/// One item's line in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub id: ItemId,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub correct: bool,
}

impl ExerciseReport {
    /// Build a report entry from one grading pass.
    pub fn from_pass(
        exercise: &Exercise,
        selections: &SelectionState,
        outcome: &GradeOutcome,
        mistakes: Vec<MistakeRecord>,
    ) -> Self {
        let items = exercise
            .items
            .iter()
            .map(|item| ItemReport {
                id: item.id,
                question: item.question(),
                user_answer: render_selection(exercise, item, selections.get(&item.id)),
                correct_answer: render_key(exercise, item),
                correct: outcome.is_correct(item.id).unwrap_or(false),
            })
            .collect();

        Self {
            exercise_id: exercise.id.clone(),
            title: exercise.title.clone(),
            correct: outcome.correct,
            total: outcome.total(),
            items,
            mistakes,
            feedback: None,
            feedback_error: None,
        }
    }

    pub fn score(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl WorksheetReport {
    pub fn new(exercises: Vec<ExerciseReport>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exercises,
        }
    }

    /// `(correct, total)` summed over every exercise.
    pub fn totals(&self) -> (usize, usize) {
        self.exercises
            .iter()
            .fold((0, 0), |(c, t), ex| (c + ex.correct, t + ex.total))
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: WorksheetReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::grading::grade;
    use crate::mistakes::{collect_mistakes, NO_ANSWER};
    use crate::model::Selection;

    fn sample() -> WorksheetReport {
        let ex = catalog::weather_words();
        let sel: SelectionState = [
            (1, Selection::Choice("snowing".into())),
            (2, Selection::Choice("windy".into())),
        ]
        .into_iter()
        .collect();
        let outcome = grade(&ex, &sel);
        let mistakes = collect_mistakes(&ex, &sel, &outcome, &ex.context);
        WorksheetReport::new(vec![ExerciseReport::from_pass(&ex, &sel, &outcome, mistakes)])
    }

    #[test]
    fn exercise_report_lists_every_item() {
        let report = sample();
        let ex = &report.exercises[0];
        assert_eq!(ex.items.len(), 6);
        assert_eq!(ex.correct, 1);
        assert!(ex.items[0].correct);
        assert_eq!(ex.items[1].user_answer, "windy");
        assert_eq!(ex.items[1].correct_answer, "hailing");
        assert_eq!(ex.items[2].user_answer, NO_ANSWER);
        assert_eq!(ex.mistakes.len(), 5);
    }

    #[test]
    fn totals_sum_exercises() {
        let mut report = sample();
        report.exercises.push(report.exercises[0].clone());
        assert_eq!(report.totals(), (2, 12));
    }

    #[test]
    fn json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let report = sample();
        report.save_json(&path).unwrap();

        let loaded = WorksheetReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.exercises[0].mistakes, report.exercises[0].mistakes);
    }
}
