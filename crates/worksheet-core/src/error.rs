//! Error types for dataset construction and shell-side session misuse.
//!
//! Grading itself has no error type: it is total over well-formed datasets.

use thiserror::Error;

use crate::model::ItemId;

/// An exercise dataset breaks a structural rule or the answer-space invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// The exercise has no items.
    #[error("exercise '{0}' has no items")]
    Empty(String),

    /// Two items share an id.
    #[error("duplicate item id: {0}")]
    DuplicateItem(ItemId),

    /// Two choices in the same list share an id.
    #[error("duplicate choice id '{choice}'")]
    DuplicateChoice { item: Option<ItemId>, choice: String },

    /// A single-choice item offers too few or too many options.
    #[error("item {item} offers {count} options, expected 2 to 7")]
    OptionCount { item: ItemId, count: usize },

    /// The answer key's type does not fit the exercise's grading rule.
    #[error("item {item}: answer key does not fit rule '{rule}'")]
    KeyMismatch { item: ItemId, rule: &'static str },

    /// The answer key names a value the learner cannot select.
    #[error("item {item}: answer '{answer}' is not in the answer space")]
    AnswerOutsideSpace { item: ItemId, answer: String },
}

/// The shell asked the session for something the exercise does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No item with this id in the exercise.
    #[error("no item {0} in this exercise")]
    UnknownItem(ItemId),

    /// Raw input could not be read as an answer for the item.
    #[error("item {item}: {reason}")]
    InvalidAnswer { item: ItemId, reason: String },
}
