//! The feedback coach boundary.
//!
//! A coach turns one grading pass into gamified feedback. Implementations
//! live in the `worksheet-coach` crate; the session only ever sees this trait
//! and the request/response shapes below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mistakes::MistakeRecord;

// ---------------------------------------------------------------------------
// Feedback coach trait
// ---------------------------------------------------------------------------

/// Trait for generative backends that coach a learner after a check.
#[async_trait]
pub trait FeedbackCoach: Send + Sync {
    /// Backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Model identifier the backend will call.
    fn model(&self) -> &str;

    /// Produce feedback for one grading pass.
    async fn coach(&self, request: &FeedbackRequest) -> anyhow::Result<FeedbackResponse>;
}

/// What the coach is told about a grading pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Exercise title, e.g. "Task 5: Weather Vocabulary".
    pub task_name: String,
    pub mistakes: Vec<MistakeRecord>,
    pub score: u32,
    pub total: u32,
}

impl FeedbackRequest {
    pub fn is_perfect(&self) -> bool {
        self.mistakes.is_empty()
    }
}

/// Gamified feedback returned by a coach. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub badge_name: String,
    pub badge_emoji: String,
    pub xp_earned: u32,
    pub feedback_title: String,
    pub feedback_message: String,
    pub key_tip: String,
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON object from a model reply.
///
/// Handles:
/// - A ```json``` block (first one wins)
/// - A generic ``` block when no json-tagged block exists
/// - Raw text, trimmed to the outermost `{ ... }` when present
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_block = None;
    let mut generic_block = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_block.get_or_insert_with(|| current_block.clone());
            } else {
                generic_block.get_or_insert_with(|| current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated (unclosed) block: keep what arrived
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_block.get_or_insert(current_block);
        } else {
            generic_block.get_or_insert(current_block);
        }
    }

    if let Some(block) = json_block.or(generic_block) {
        return block.trim().to_string();
    }

    let trimmed = response.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}
