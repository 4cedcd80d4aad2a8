//! Coach configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use worksheet_core::traits::FeedbackCoach;

use crate::anthropic::AnthropicCoach;
use crate::error::CoachError;
use crate::gemini::{GeminiCoach, DEFAULT_TIMEOUT_SECS};
use crate::mock::MockCoach;
use crate::openai::OpenAiCoach;

/// Configuration for a single feedback coach.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CoachConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Anthropic {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Mock {
        /// When set, every call fails with this message.
        #[serde(default)]
        fail: Option<String>,
    },
}

impl std::fmt::Debug for CoachConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoachConfig::Gemini {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            CoachConfig::Anthropic {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            CoachConfig::OpenAI {
                api_key: _,
                base_url,
                model,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .field("org_id", org_id)
                .finish(),
            CoachConfig::Mock { fail } => f.debug_struct("Mock").field("fail", fail).finish(),
        }
    }
}

/// Top-level worksheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetConfig {
    /// Coach configurations keyed by name.
    #[serde(default)]
    pub coaches: HashMap<String, CoachConfig>,
    /// Coach used when none is named on the command line.
    #[serde(default = "default_coach")]
    pub default_coach: String,
    /// Per-request timeout for coach calls.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Directory or file of extra exercise datasets.
    #[serde(default)]
    pub datasets: Option<PathBuf>,
}

fn default_coach() -> String {
    "gemini".to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            coaches: HashMap::new(),
            default_coach: default_coach(),
            timeout_secs: default_timeout(),
            datasets: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_opt(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| resolve_env_vars(v))
}

/// Resolve env vars in a coach config.
fn resolve_coach_config(config: &CoachConfig) -> CoachConfig {
    match config {
        CoachConfig::Gemini {
            api_key,
            base_url,
            model,
        } => CoachConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            model: resolve_opt(model),
        },
        CoachConfig::Anthropic {
            api_key,
            base_url,
            model,
        } => CoachConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            model: resolve_opt(model),
        },
        CoachConfig::OpenAI {
            api_key,
            base_url,
            model,
            org_id,
        } => CoachConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            model: resolve_opt(model),
            org_id: resolve_opt(org_id),
        },
        CoachConfig::Mock { fail } => CoachConfig::Mock { fail: fail.clone() },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `worksheet.toml` in the current directory
/// 2. `~/.config/worksheet/config.toml`
///
/// Environment variable overrides: `WORKSHEET_GEMINI_KEY` (or `API_KEY`),
/// `WORKSHEET_ANTHROPIC_KEY`, `WORKSHEET_OPENAI_KEY`.
pub fn load_config() -> Result<WorksheetConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WorksheetConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("worksheet.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<WorksheetConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WorksheetConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok());

    let resolved: HashMap<String, CoachConfig> = config
        .coaches
        .iter()
        .map(|(k, v)| (k.clone(), resolve_coach_config(v)))
        .collect();
    config.coaches = resolved;

    Ok(config)
}

/// Overlay API keys from the environment onto the named coach entries.
fn apply_env_overrides(config: &mut WorksheetConfig, lookup: impl Fn(&str) -> Option<String>) {
    let gemini_key = lookup("WORKSHEET_GEMINI_KEY").or_else(|| lookup("API_KEY"));
    if let Some(key) = gemini_key {
        let entry = config
            .coaches
            .entry("gemini".into())
            .or_insert(CoachConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let CoachConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(key) = lookup("WORKSHEET_ANTHROPIC_KEY") {
        let entry = config
            .coaches
            .entry("anthropic".into())
            .or_insert(CoachConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let CoachConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(key) = lookup("WORKSHEET_OPENAI_KEY") {
        let entry = config
            .coaches
            .entry("openai".into())
            .or_insert(CoachConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                model: None,
                org_id: None,
            });
        if let CoachConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("worksheet"))
}

/// Create a coach instance from its configuration.
pub fn create_coach(
    config: &CoachConfig,
    timeout_secs: u64,
) -> Result<Box<dyn FeedbackCoach>, CoachError> {
    let coach: Box<dyn FeedbackCoach> = match config {
        CoachConfig::Gemini {
            api_key,
            base_url,
            model,
        } => {
            let mut coach =
                GeminiCoach::new(api_key, base_url.clone())?.with_timeout(timeout_secs);
            if let Some(model) = model {
                coach = coach.with_model(model);
            }
            Box::new(coach)
        }
        CoachConfig::Anthropic {
            api_key,
            base_url,
            model,
        } => {
            let mut coach =
                AnthropicCoach::new(api_key, base_url.clone())?.with_timeout(timeout_secs);
            if let Some(model) = model {
                coach = coach.with_model(model);
            }
            Box::new(coach)
        }
        CoachConfig::OpenAI {
            api_key,
            base_url,
            model,
            org_id,
        } => {
            let mut coach = OpenAiCoach::new(api_key, base_url.clone(), org_id.clone())?
                .with_timeout(timeout_secs);
            if let Some(model) = model {
                coach = coach.with_model(model);
            }
            Box::new(coach)
        }
        CoachConfig::Mock { fail: None } => Box::new(MockCoach::new()),
        CoachConfig::Mock {
            fail: Some(message),
        } => Box::new(MockCoach::failing(message.clone())),
    };
    Ok(coach)
}

/// Pick a coach by name, falling back to `default_coach`.
///
/// A well-known backend without a configured key is a `MissingCredential`
/// error; `mock` works without any configuration.
pub fn resolve_coach(
    config: &WorksheetConfig,
    name: Option<&str>,
) -> Result<Box<dyn FeedbackCoach>> {
    let name = name.unwrap_or(&config.default_coach);

    let coach: Box<dyn FeedbackCoach> = match config.coaches.get(name) {
        Some(entry) => create_coach(entry, config.timeout_secs)?,
        None => match name {
            "mock" => Box::new(MockCoach::new()),
            "gemini" | "anthropic" | "openai" => {
                return Err(CoachError::MissingCredential(name.to_string()).into())
            }
            other => anyhow::bail!("unknown coach '{other}'"),
        },
    };

    tracing::debug!(coach = coach.name(), model = coach.model(), "coach ready");
    Ok(coach)
}
