//! Prompt text and reply parsing shared by every coach backend.

use worksheet_core::traits::{extract_json_from_markdown, FeedbackRequest, FeedbackResponse};

use crate::error::CoachError;

/// Instructions for backends without a structured-output schema.
pub const SYSTEM_PROMPT: &str = "You are an upbeat English teacher coaching A2-level ESL students. \
Respond ONLY with a JSON object with the string keys badgeName, badgeEmoji, feedbackTitle, \
feedbackMessage, keyTip and the integer key xpEarned. Do not add any other text.";

/// Build the user prompt for one grading pass.
pub fn build_prompt(request: &FeedbackRequest) -> String {
    let context = if request.is_perfect() {
        "The student got a perfect score! Celebrate their achievement.".to_string()
    } else {
        let mistakes = serde_json::to_string(&request.mistakes).unwrap_or_default();
        format!(
            "The student made {} mistakes. Here they are: {mistakes}.",
            request.mistakes.len()
        )
    };

    format!(
        "Task: {}\n\
         Score: {}/{}\n\
         Context: {context}\n\
         \n\
         Generate a gamified feedback response for an ESL student (A2 level).\n\
         Include a creative 'Badge' name, an Emoji for the badge, a hypothetical 'XP' amount (100-500),\n\
         a short encouraging feedback message, and one specific grammar/vocab tip if there were mistakes.",
        request.task_name, request.score, request.total
    )
}

/// Parse a model reply into feedback, tolerating markdown fences.
pub fn parse_feedback(text: &str) -> Result<FeedbackResponse, CoachError> {
    if text.trim().is_empty() {
        return Err(CoachError::MalformedResponse("empty reply".into()));
    }
    let json = extract_json_from_markdown(text);
    serde_json::from_str(&json).map_err(|e| CoachError::MalformedResponse(e.to_string()))
}
