//! worksheet-coach: feedback coach integrations.
//!
//! Implements the `FeedbackCoach` trait for Gemini, Anthropic and
//! OpenAI-compatible APIs, plus an offline mock, so a checked exercise can be
//! turned into gamified feedback by any configured backend.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod prompt;

pub use config::{create_coach, load_config, resolve_coach, CoachConfig, WorksheetConfig};
pub use error::CoachError;
