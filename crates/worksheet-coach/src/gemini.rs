//! Gemini API coach implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use worksheet_core::traits::{FeedbackCoach, FeedbackRequest, FeedbackResponse};

use crate::error::{check_status, CoachError};
use crate::prompt::{build_prompt, parse_feedback};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini `generateContent` coach with a structured JSON response schema.
pub struct GeminiCoach {
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiCoach {
    pub fn new(api_key: &str, base_url: Option<String>) -> Result<Self, CoachError> {
        if api_key.trim().is_empty() {
            return Err(CoachError::MissingCredential("gemini".into()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CoachError::NetworkError(e.to_string()))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<GeminiError>(body)
        .ok()
        .map(|e| e.error.message)
}

/// Schema requiring every feedback field.
fn feedback_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "badgeName": { "type": "STRING" },
            "badgeEmoji": { "type": "STRING" },
            "xpEarned": { "type": "INTEGER" },
            "feedbackTitle": { "type": "STRING" },
            "feedbackMessage": { "type": "STRING" },
            "keyTip": { "type": "STRING" }
        },
        "required": [
            "badgeName",
            "badgeEmoji",
            "xpEarned",
            "feedbackTitle",
            "feedbackMessage",
            "keyTip"
        ]
    })
}

#[async_trait]
impl FeedbackCoach for GeminiCoach {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, task = %request.task_name))]
    async fn coach(&self, request: &FeedbackRequest) -> anyhow::Result<FeedbackResponse> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: feedback_schema(),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::from_send(e, self.timeout_secs))?;

        let response = check_status(response, &self.model, error_message).await?;

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CoachError::MalformedResponse(format!("failed to parse response: {e}")))?;

        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(parse_feedback(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> FeedbackRequest {
        FeedbackRequest {
            task_name: "Task 1: Granny Doris".into(),
            mistakes: vec![],
            score: 5,
            total: 5,
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    #[tokio::test]
    async fn successful_feedback() {
        let server = MockServer::start().await;

        let text = r#"{"badgeName":"Story Star","badgeEmoji":"⭐","xpEarned":500,
            "feedbackTitle":"Perfect!","feedbackMessage":"You read every line.","keyTip":"Keep reading."}"#;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(text)))
            .mount(&server)
            .await;

        let coach = GeminiCoach::new("test-key", Some(server.uri())).unwrap();
        let feedback = coach.coach(&request()).await.unwrap();
        assert_eq!(feedback.badge_name, "Story Star");
        assert_eq!(feedback.xp_earned, 500);
    }

    #[tokio::test]
    async fn empty_candidates_are_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let coach = GeminiCoach::new("test-key", Some(server.uri())).unwrap();
        let err = coach.coach(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoachError>(),
            Some(CoachError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn invalid_key_is_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let coach = GeminiCoach::new("bad-key", Some(server.uri())).unwrap();
        let err = coach.coach(&request()).await.unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn unknown_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let coach = GeminiCoach::new("test-key", Some(server.uri()))
            .unwrap()
            .with_model("gemini-0");
        let err = coach.coach(&request()).await.unwrap_err();
        assert!(err.to_string().contains("model not found: gemini-0"));
    }

    #[test]
    fn empty_key_is_missing_credential() {
        assert!(matches!(
            GeminiCoach::new("  ", None),
            Err(CoachError::MissingCredential(_))
        ));
    }
}
