//! Per-exercise interaction state.
//!
//! An [`ExerciseSession`] holds the learner's uncommitted selections for one
//! exercise and the outcome of the last grading pass. Results only exist in
//! [`CheckPhase::Checked`]; any edit after a check moves the session to
//! [`CheckPhase::Stale`] and the old results are dropped, so a shell can never
//! show outcomes for answers that have since changed.
//!
//! Feedback from the coach is tracked in a separate [`CoachState`]. Each
//! request is tagged with a [`CoachTicket`]; a result carrying a ticket from
//! before the latest check or reset is ignored.

use crate::error::SessionError;
use crate::grading::{grade, GradeOutcome};
use crate::mistakes::{collect_mistakes, MistakeRecord};
use crate::model::{Exercise, ItemId, Selection, SelectionState};
use crate::traits::{FeedbackRequest, FeedbackResponse};

/// User-facing message shown when the coach call fails.
pub const COACH_UNAVAILABLE: &str = "AI Coach is taking a nap. Try again later!";

/// Where the session stands relative to grading.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckPhase {
    /// Never checked since mount or reset.
    Unchecked,
    /// Checked once, then edited; previous results discarded.
    Stale,
    /// Results of the latest pass, valid for the current selections.
    Checked(CheckedPass),
}

/// Everything one grading pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedPass {
    pub outcome: GradeOutcome,
    pub mistakes: Vec<MistakeRecord>,
}

/// What a shell should render for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Unanswered,
    Answered,
    Correct,
    Incorrect,
}

/// Identifies one coach request; compared against the session's generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoachTicket(u64);

/// Lifecycle of the coach call for the latest check.
#[derive(Debug, Clone, PartialEq)]
pub enum CoachState {
    Idle,
    Loading,
    Ready(FeedbackResponse),
    /// Failure shown to the learner; the cause is kept for logging.
    Failed { message: String, cause: String },
}

/// Selection, result and coach state for one exercise.
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    exercise: Exercise,
    selections: SelectionState,
    phase: CheckPhase,
    coach: CoachState,
    generation: u64,
}

impl ExerciseSession {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            selections: SelectionState::new(),
            phase: CheckPhase::Unchecked,
            coach: CoachState::Idle,
            generation: 0,
        }
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    pub fn phase(&self) -> &CheckPhase {
        &self.phase
    }

    pub fn coach_state(&self) -> &CoachState {
        &self.coach
    }

    pub fn is_checked(&self) -> bool {
        matches!(self.phase, CheckPhase::Checked(_))
    }

    /// The latest pass, if it is still valid for the current selections.
    pub fn checked(&self) -> Option<&CheckedPass> {
        match &self.phase {
            CheckPhase::Checked(pass) => Some(pass),
            _ => None,
        }
    }

    /// `(correct, total)` of the latest valid pass.
    pub fn score(&self) -> Option<(usize, usize)> {
        self.checked()
            .map(|pass| (pass.outcome.correct, pass.outcome.total()))
    }

    /// Set one item's selection.
    pub fn select(&mut self, id: ItemId, selection: Selection) -> Result<(), SessionError> {
        self.ensure_item(id)?;
        self.selections.insert(id, selection);
        self.invalidate();
        Ok(())
    }

    /// Parse raw learner input for an item and select it; blank input clears.
    pub fn answer(&mut self, id: ItemId, raw: &str) -> Result<(), SessionError> {
        let item = self.exercise.item(id).ok_or(SessionError::UnknownItem(id))?;
        let parsed = Selection::parse(&self.exercise, item, raw)
            .map_err(|reason| SessionError::InvalidAnswer { item: id, reason })?;
        match parsed {
            Some(selection) => self.select(id, selection),
            None => self.clear(id),
        }
    }

    /// Remove one item's selection.
    pub fn clear(&mut self, id: ItemId) -> Result<(), SessionError> {
        self.ensure_item(id)?;
        if self.selections.remove(&id).is_some() {
            self.invalidate();
        }
        Ok(())
    }

    /// Run a full grading pass over the current selections.
    pub fn check(&mut self) -> CheckedPass {
        let outcome = grade(&self.exercise, &self.selections);
        let mistakes = collect_mistakes(
            &self.exercise,
            &self.selections,
            &outcome,
            &self.exercise.context,
        );
        self.generation += 1;
        self.coach = CoachState::Idle;
        let pass = CheckedPass { outcome, mistakes };
        self.phase = CheckPhase::Checked(pass.clone());
        pass
    }

    /// Drop all selections, results and coach feedback.
    pub fn reset(&mut self) {
        self.selections.clear();
        self.phase = CheckPhase::Unchecked;
        self.coach = CoachState::Idle;
        self.generation += 1;
    }

    /// Render state for one item.
    pub fn item_state(&self, id: ItemId) -> Option<ItemState> {
        self.exercise.item(id)?;
        if let Some(pass) = self.checked() {
            return pass.outcome.is_correct(id).map(|ok| {
                if ok {
                    ItemState::Correct
                } else {
                    ItemState::Incorrect
                }
            });
        }
        Some(if self.selections.contains_key(&id) {
            ItemState::Answered
        } else {
            ItemState::Unanswered
        })
    }

    /// Start a coach request for the latest pass.
    ///
    /// Returns `None` when the session has no valid results to report.
    pub fn begin_feedback(&mut self) -> Option<(CoachTicket, FeedbackRequest)> {
        let pass = self.checked()?;
        let request = FeedbackRequest {
            task_name: self.exercise.title.clone(),
            mistakes: pass.mistakes.clone(),
            score: pass.outcome.correct as u32,
            total: pass.outcome.total() as u32,
        };
        self.coach = CoachState::Loading;
        Some((CoachTicket(self.generation), request))
    }

    /// Apply a coach result. Returns `false` when the ticket was superseded
    /// by a later check or reset and the result was dropped.
    pub fn finish_feedback(
        &mut self,
        ticket: CoachTicket,
        result: Result<FeedbackResponse, String>,
    ) -> bool {
        if ticket.0 != self.generation || !self.is_checked() {
            tracing::debug!(exercise = %self.exercise.id, "ignoring superseded coach result");
            return false;
        }
        self.coach = match result {
            Ok(response) => CoachState::Ready(response),
            Err(cause) => CoachState::Failed {
                message: COACH_UNAVAILABLE.to_string(),
                cause,
            },
        };
        true
    }

    fn ensure_item(&self, id: ItemId) -> Result<(), SessionError> {
        self.exercise
            .item(id)
            .map(|_| ())
            .ok_or(SessionError::UnknownItem(id))
    }

    fn invalidate(&mut self) {
        if self.is_checked() {
            self.phase = CheckPhase::Stale;
            self.coach = CoachState::Idle;
            self.generation += 1;
        }
    }
}
