//! Core data model types for the worksheet.
//!
//! An [`Exercise`] is one fixed, ordered dataset of gradable items sharing a
//! single [`GradingRule`]. Exercises never change at runtime; only the
//! learner's [`Selection`]s do.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Stable, display-ordered identifier of an item within one exercise.
pub type ItemId = u32;

/// The learner's current answers for one exercise, keyed by item id.
pub type SelectionState = BTreeMap<ItemId, Selection>;

/// Smallest and largest number of inline options a single-choice item may offer.
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 7;

/// A labeled choice, either inline on an item or in an exercise's shared pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier the learner selects (e.g. "A", "c", or the word itself).
    pub id: String,
    /// Text shown to the learner.
    pub label: String,
    /// Worked-example entry: shown crossed out, never selectable.
    #[serde(default)]
    pub example: bool,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            example: false,
        }
    }

    /// A choice whose id is its own label (word banks, response pools).
    pub fn word(word: impl Into<String>) -> Self {
        let word = word.into();
        Self::new(word.clone(), word)
    }

    pub fn as_example(mut self) -> Self {
        self.example = true;
        self
    }

    /// Human-readable rendering, e.g. `"a - tornado"` or just `"windy"`.
    pub fn display(&self) -> String {
        if self.id == self.label {
            self.label.clone()
        } else {
            format!("{} - {}", self.id, self.label)
        }
    }
}

/// How every item of an exercise is compared against its answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradingRule {
    /// True/false comprehension: exact boolean equality.
    TrueFalse,
    /// Inline labeled options per item: exact id equality.
    SingleChoice,
    /// Typed answer compared after normalization.
    FreeText {
        /// Also accept `did not` / `was not` / `were not` for contracted keys.
        #[serde(default)]
        expand_contractions: bool,
    },
    /// Pick from the exercise's shared pool: exact id equality.
    PickList,
}

impl GradingRule {
    /// Short machine name used in listings and TOML.
    pub fn as_str(&self) -> &'static str {
        match self {
            GradingRule::TrueFalse => "true_false",
            GradingRule::SingleChoice => "single_choice",
            GradingRule::FreeText { .. } => "free_text",
            GradingRule::PickList => "pick_list",
        }
    }
}

impl fmt::Display for GradingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingRule::TrueFalse => write!(f, "true/false"),
            GradingRule::SingleChoice => write!(f, "multiple choice"),
            GradingRule::FreeText {
                expand_contractions: true,
            } => write!(f, "free text (contractions)"),
            GradingRule::FreeText { .. } => write!(f, "free text"),
            GradingRule::PickList => write!(f, "pick from list"),
        }
    }
}

/// The expected answer for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Bool(bool),
    Choice(String),
    Text(String),
}

/// One gradable question.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseItem {
    pub id: ItemId,
    /// Question text, or the source sentence to transform.
    pub prompt: String,
    /// Short cue shown next to the prompt, e.g. "How long?".
    pub hint: Option<String>,
    /// Inline options (single-choice items only).
    pub options: Vec<Choice>,
    pub answer: AnswerKey,
}

impl ExerciseItem {
    /// Prompt as reported to the coach, with the hint in front when present.
    pub fn question(&self) -> String {
        match &self.hint {
            Some(hint) => format!("({hint}) {}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// An exercise dataset: ordered items sharing one grading rule.
#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    /// Unique identifier, e.g. "past-negatives".
    pub id: String,
    /// Display title, e.g. "Task 3: Past Simple Negatives".
    pub title: String,
    /// Worksheet section the exercise belongs to, e.g. "Grammar".
    pub section: String,
    /// What the learner is asked to do.
    pub instructions: String,
    /// Fixed topic string attached to every mistake record.
    pub context: String,
    /// Reading text or audio script the items refer to.
    pub passage: Option<String>,
    /// Worked example shown above the items.
    pub example: Option<String>,
    pub rule: GradingRule,
    /// Shared pick-list for [`GradingRule::PickList`] exercises.
    pub pool: Vec<Choice>,
    pub items: Vec<ExerciseItem>,
}

impl Exercise {
    pub fn item(&self, id: ItemId) -> Option<&ExerciseItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Choices the learner may pick for `item` (examples excluded).
    pub fn choices_for<'a>(&'a self, item: &'a ExerciseItem) -> impl Iterator<Item = &'a Choice> {
        let source = match self.rule {
            GradingRule::SingleChoice => item.options.as_slice(),
            GradingRule::PickList => self.pool.as_slice(),
            GradingRule::TrueFalse | GradingRule::FreeText { .. } => &[],
        };
        source.iter().filter(|c| !c.example)
    }

    /// Look up a selectable choice by id for `item`.
    pub fn find_choice<'a>(&'a self, item: &'a ExerciseItem, id: &str) -> Option<&'a Choice> {
        self.choices_for(item).find(|c| c.id == id)
    }

    /// Check the answer-space invariant and structural rules.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.items.is_empty() {
            return Err(DatasetError::Empty(self.id.clone()));
        }

        let mut seen_items = HashSet::new();
        for item in &self.items {
            if !seen_items.insert(item.id) {
                return Err(DatasetError::DuplicateItem(item.id));
            }
        }

        ensure_unique_choices(&self.pool, None)?;

        for item in &self.items {
            match (self.rule, &item.answer) {
                (GradingRule::TrueFalse, AnswerKey::Bool(_)) => {}
                (GradingRule::SingleChoice, AnswerKey::Choice(id)) => {
                    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&item.options.len()) {
                        return Err(DatasetError::OptionCount {
                            item: item.id,
                            count: item.options.len(),
                        });
                    }
                    ensure_unique_choices(&item.options, Some(item.id))?;
                    if self.find_choice(item, id).is_none() {
                        return Err(DatasetError::AnswerOutsideSpace {
                            item: item.id,
                            answer: id.clone(),
                        });
                    }
                }
                (GradingRule::PickList, AnswerKey::Choice(id)) => {
                    if self.find_choice(item, id).is_none() {
                        return Err(DatasetError::AnswerOutsideSpace {
                            item: item.id,
                            answer: id.clone(),
                        });
                    }
                }
                (GradingRule::FreeText { .. }, AnswerKey::Text(text)) => {
                    if text.trim().is_empty() {
                        return Err(DatasetError::AnswerOutsideSpace {
                            item: item.id,
                            answer: text.clone(),
                        });
                    }
                }
                (rule, _) => {
                    return Err(DatasetError::KeyMismatch {
                        item: item.id,
                        rule: rule.as_str(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn ensure_unique_choices(choices: &[Choice], item: Option<ItemId>) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for choice in choices {
        if !seen.insert(choice.id.as_str()) {
            return Err(DatasetError::DuplicateChoice {
                item,
                choice: choice.id.clone(),
            });
        }
    }
    Ok(())
}

/// The learner's raw answer for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Bool(bool),
    Choice(String),
    Text(String),
}

/// Parse a true/false answer the way a learner would type it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruthValue(pub bool);

impl FromStr for TruthValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t" | "true" | "yes" | "y" => Ok(TruthValue(true)),
            "f" | "false" | "no" | "n" => Ok(TruthValue(false)),
            other => Err(format!("expected true or false, got '{other}'")),
        }
    }
}

impl Selection {
    /// Turn raw learner input into a selection for `item` of `exercise`.
    ///
    /// Returns `Ok(None)` for blank input. Choice ids are matched
    /// case-insensitively, then against labels, so both `b` and `avalanche`
    /// select the same noun.
    pub fn parse(
        exercise: &Exercise,
        item: &ExerciseItem,
        raw: &str,
    ) -> Result<Option<Selection>, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match exercise.rule {
            GradingRule::TrueFalse => trimmed
                .parse::<TruthValue>()
                .map(|t| Some(Selection::Bool(t.0))),
            GradingRule::FreeText { .. } => Ok(Some(Selection::Text(raw.to_string()))),
            GradingRule::SingleChoice | GradingRule::PickList => {
                let lowered = trimmed.to_lowercase();
                exercise
                    .choices_for(item)
                    .find(|c| c.id.to_lowercase() == lowered)
                    .or_else(|| {
                        exercise
                            .choices_for(item)
                            .find(|c| c.label.to_lowercase() == lowered)
                    })
                    .map(|c| Some(Selection::Choice(c.id.clone())))
                    .ok_or_else(|| {
                        let ids: Vec<&str> =
                            exercise.choices_for(item).map(|c| c.id.as_str()).collect();
                        format!("'{trimmed}' is not one of: {}", ids.join(", "))
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick_exercise() -> Exercise {
        Exercise {
            id: "nouns".into(),
            title: "Nouns".into(),
            section: String::new(),
            instructions: String::new(),
            context: String::new(),
            passage: None,
            example: None,
            rule: GradingRule::PickList,
            pool: vec![
                Choice::new("a", "tornado"),
                Choice::new("b", "avalanche"),
                Choice::new("d", "earthquake").as_example(),
            ],
            items: vec![ExerciseItem {
                id: 1,
                prompt: "Wind that travels in a circle.".into(),
                hint: None,
                options: vec![],
                answer: AnswerKey::Choice("a".into()),
            }],
        }
    }

    #[test]
    fn choice_display() {
        assert_eq!(Choice::new("a", "tornado").display(), "a - tornado");
        assert_eq!(Choice::word("windy").display(), "windy");
    }

    #[test]
    fn truth_value_parse() {
        assert_eq!("T".parse::<TruthValue>().unwrap(), TruthValue(true));
        assert_eq!("false".parse::<TruthValue>().unwrap(), TruthValue(false));
        assert!("maybe".parse::<TruthValue>().is_err());
    }

    #[test]
    fn selection_parse_matches_id_or_label() {
        let ex = pick_exercise();
        let item = &ex.items[0];
        assert_eq!(
            Selection::parse(&ex, item, "A").unwrap(),
            Some(Selection::Choice("a".into()))
        );
        assert_eq!(
            Selection::parse(&ex, item, "Avalanche").unwrap(),
            Some(Selection::Choice("b".into()))
        );
        assert_eq!(Selection::parse(&ex, item, "   ").unwrap(), None);
    }

    #[test]
    fn selection_parse_rejects_example_entries() {
        let ex = pick_exercise();
        let err = Selection::parse(&ex, &ex.items[0], "d").unwrap_err();
        assert!(err.contains("a, b"), "got: {err}");
    }

    #[test]
    fn validate_accepts_pool_answer() {
        assert!(pick_exercise().validate().is_ok());
    }

    #[test]
    fn validate_rejects_example_as_answer() {
        let mut ex = pick_exercise();
        ex.items[0].answer = AnswerKey::Choice("d".into());
        assert!(matches!(
            ex.validate(),
            Err(DatasetError::AnswerOutsideSpace { item: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_wrong_key_type() {
        let mut ex = pick_exercise();
        ex.items[0].answer = AnswerKey::Bool(true);
        assert!(matches!(
            ex.validate(),
            Err(DatasetError::KeyMismatch { item: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_items() {
        let mut ex = pick_exercise();
        let dup = ex.items[0].clone();
        ex.items.push(dup);
        assert!(matches!(ex.validate(), Err(DatasetError::DuplicateItem(1))));
    }

    #[test]
    fn validate_rejects_single_option() {
        let mut ex = pick_exercise();
        ex.rule = GradingRule::SingleChoice;
        ex.items[0].options = vec![Choice::new("A", "only one")];
        ex.items[0].answer = AnswerKey::Choice("A".into());
        assert!(matches!(
            ex.validate(),
            Err(DatasetError::OptionCount { item: 1, count: 1 })
        ));
    }

    #[test]
    fn rule_serde_shape() {
        let rule: GradingRule =
            toml::from_str("kind = \"free_text\"\nexpand_contractions = true").unwrap();
        assert_eq!(
            rule,
            GradingRule::FreeText {
                expand_contractions: true
            }
        );
        assert_eq!(rule.as_str(), "free_text");
    }
}
