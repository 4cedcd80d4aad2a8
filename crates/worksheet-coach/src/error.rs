//! Coach error types.

use thiserror::Error;

/// Errors that can occur when asking a coach for feedback.
#[derive(Debug, Error)]
pub enum CoachError {
    /// No API key was provisioned for the coach.
    #[error("API key not found for coach '{0}'")]
    MissingCredential(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The reply did not contain the required feedback fields.
    #[error("malformed coach response: {0}")]
    MalformedResponse(String),
}

impl CoachError {
    /// Map a transport failure from `reqwest`.
    pub(crate) fn from_send(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            CoachError::Timeout(timeout_secs)
        } else {
            CoachError::NetworkError(err.to_string())
        }
    }
}

/// Turn non-success HTTP statuses into `CoachError`s.
///
/// `extract_message` pulls the provider's error message out of a JSON body.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
    extract_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, CoachError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(CoachError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 404 {
        return Err(CoachError::ModelNotFound(model.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);
    if status == 401 || status == 403 {
        return Err(CoachError::AuthenticationFailed(message));
    }
    Err(CoachError::ApiError { status, message })
}
