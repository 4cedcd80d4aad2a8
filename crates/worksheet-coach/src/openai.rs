//! OpenAI API coach implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use worksheet_core::traits::{FeedbackCoach, FeedbackRequest, FeedbackResponse};

use crate::error::{check_status, CoachError};
use crate::gemini::DEFAULT_TIMEOUT_SECS;
use crate::prompt::{build_prompt, parse_feedback, SYSTEM_PROMPT};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible chat completions coach.
pub struct OpenAiCoach {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiCoach {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
    ) -> Result<Self, CoachError> {
        if api_key.trim().is_empty() {
            return Err(CoachError::MissingCredential("openai".into()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CoachError::NetworkError(e.to_string()))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            org_id,
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
struct OpenAiRequest {
    model: String,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<OpenAiError>(body)
        .ok()
        .map(|e| e.error.message)
}

#[async_trait]
impl FeedbackCoach for OpenAiCoach {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, task = %request.task_name))]
    async fn coach(&self, request: &FeedbackRequest) -> anyhow::Result<FeedbackResponse> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            temperature: 0.7,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .timeout(Duration::from_secs(self.timeout_secs));

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::from_send(e, self.timeout_secs))?;

        let response = check_status(response, &self.model, error_message).await?;

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| CoachError::MalformedResponse(format!("failed to parse response: {e}")))?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(parse_feedback(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> FeedbackRequest {
        FeedbackRequest {
            task_name: "Task 3: Past Simple Negatives".into(),
            mistakes: vec![],
            score: 6,
            total: 6,
        }
    }

    #[tokio::test]
    async fn successful_feedback() {
        let server = MockServer::start().await;

        let content = json!({
            "badgeName": "Grammar Guardian",
            "badgeEmoji": "🛡️",
            "xpEarned": 300,
            "feedbackTitle": "Solid work",
            "feedbackMessage": "Your negatives are spot on.",
            "keyTip": "didn't = did not"
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("OpenAI-Organization", "org-1"))
            .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }],
                "model": "gpt-4o-mini"
            })))
            .mount(&server)
            .await;

        let coach = OpenAiCoach::new("test-key", Some(server.uri()), Some("org-1".into())).unwrap();
        let feedback = coach.coach(&request()).await.unwrap();
        assert_eq!(feedback.badge_name, "Grammar Guardian");
        assert_eq!(feedback.xp_earned, 300);
    }

    #[tokio::test]
    async fn api_error_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "message": "server overloaded" }
            })))
            .mount(&server)
            .await;

        let coach = OpenAiCoach::new("test-key", Some(server.uri()), None).unwrap();
        let err = coach.coach(&request()).await.unwrap_err();
        match err.downcast_ref::<CoachError>() {
            Some(CoachError::ApiError { status, message }) => {
                assert_eq!(*status, 500);
                assert_eq!(message, "server overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_reply_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let coach = OpenAiCoach::new("test-key", Some(server.uri()), None)
            .unwrap()
            .with_timeout(1);
        let err = coach.coach(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoachError>(),
            Some(CoachError::Timeout(1))
        ));
    }
}
