//! Mock coach for testing and offline practice.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use worksheet_core::traits::{FeedbackCoach, FeedbackRequest, FeedbackResponse};

use crate::error::CoachError;

enum Behavior {
    /// Derive feedback from the request.
    Derived,
    Fixed(FeedbackResponse),
    Fail(String),
}

/// A coach that never touches the network.
///
/// By default the feedback is derived from the request, so the same pass
/// always yields the same badge and XP.
pub struct MockCoach {
    behavior: Behavior,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<FeedbackRequest>>,
}

impl Default for MockCoach {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCoach {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Derived)
    }

    /// Create a mock that always returns the same feedback.
    pub fn with_fixed_response(response: FeedbackResponse) -> Self {
        Self::with_behavior(Behavior::Fixed(response))
    }

    /// Create a mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this coach.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this coach.
    pub fn last_request(&self) -> Option<FeedbackRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

/// XP scales linearly from 100 (nothing right) to 500 (perfect).
fn derived_feedback(request: &FeedbackRequest) -> FeedbackResponse {
    let xp = if request.total == 0 {
        100
    } else {
        100 + 400 * request.score / request.total
    };

    if request.is_perfect() {
        return FeedbackResponse {
            badge_name: "Flawless Finisher".into(),
            badge_emoji: "🏆".into(),
            xp_earned: xp,
            feedback_title: "Perfect score!".into(),
            feedback_message: format!(
                "You got all {} right in {}. Amazing work!",
                request.total, request.task_name
            ),
            key_tip: "Try the next task to keep your streak going.".into(),
        };
    }

    let tip = request
        .mistakes
        .first()
        .map(|m| format!("Remember: \"{}\" -> {}", m.question, m.correct_answer))
        .unwrap_or_default();

    FeedbackResponse {
        badge_name: "Steady Learner".into(),
        badge_emoji: "🌱".into(),
        xp_earned: xp,
        feedback_title: format!("{} of {} correct", request.score, request.total),
        feedback_message: format!(
            "Good effort! Review the {} answer(s) you missed and try again.",
            request.mistakes.len()
        ),
        key_tip: tip,
    }
}

#[async_trait]
impl FeedbackCoach for MockCoach {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn coach(&self, request: &FeedbackRequest) -> anyhow::Result<FeedbackResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.behavior {
            Behavior::Derived => Ok(derived_feedback(request)),
            Behavior::Fixed(response) => Ok(response.clone()),
            Behavior::Fail(message) => Err(CoachError::NetworkError(message.clone()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worksheet_core::mistakes::MistakeRecord;

    fn request(score: u32, mistakes: Vec<MistakeRecord>) -> FeedbackRequest {
        FeedbackRequest {
            task_name: "Task 6: Natural Disasters".into(),
            mistakes,
            score,
            total: 6,
        }
    }

    #[tokio::test]
    async fn derived_feedback_for_perfect_score() {
        let coach = MockCoach::new();
        let feedback = coach.coach(&request(6, vec![])).await.unwrap();
        assert_eq!(feedback.xp_earned, 500);
        assert_eq!(feedback.feedback_title, "Perfect score!");
        assert_eq!(coach.call_count(), 1);
    }

    #[tokio::test]
    async fn derived_feedback_mentions_first_mistake() {
        let coach = MockCoach::new();
        let mistake = MistakeRecord {
            question: "A very large wave".into(),
            user_answer: "(empty)".into(),
            correct_answer: "f - tsunami".into(),
            context: "Topic: Natural Disasters".into(),
        };
        let feedback = coach.coach(&request(3, vec![mistake])).await.unwrap();
        assert_eq!(feedback.xp_earned, 300);
        assert!(feedback.key_tip.contains("f - tsunami"));
        assert_eq!(coach.last_request().unwrap().score, 3);
    }

    #[tokio::test]
    async fn failing_mock() {
        let coach = MockCoach::failing("offline");
        let err = coach.coach(&request(6, vec![])).await.unwrap_err();
        assert!(err.to_string().contains("offline"));
        assert_eq!(coach.call_count(), 1);
    }
}
