//! Environment-driven settings for the demos and other binaries.
//!
//! | Variable           | Meaning                                   | Default                  |
//! |--------------------|-------------------------------------------|--------------------------|
//! | `LLM_PROVIDER`     | `gemini` or `openai`                      | `gemini`                 |
//! | `GEMINI_API_KEY`   | Gemini key, required for `gemini`         |                          |
//! | `OPENAI_API_KEY`   | key for `openai`                          |                          |
//! | `LLM_MODEL`        | default model                             | `gemini-2.0-flash` or `gpt-4o-mini` |
//! | `LLM_BASE_URL`     | provider endpoint                         | provider's public API    |
//! | `LLM_TIMEOUT_SECS` | HTTP timeout                              | `60`                     |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::backend::gemini::GEMINI_BASE_URL;
use crate::error::Result;
use crate::exec_ctx::{ExecCtx, DEFAULT_MODEL};
use crate::WorkflowError;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl FromStr for Provider {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(WorkflowError::InvalidConfig(format!(
                "unknown LLM_PROVIDER '{}' (expected 'gemini' or 'openai')",
                other
            ))),
        }
    }
}

impl Provider {
    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_BASE_URL,
            Provider::OpenAi => OPENAI_BASE_URL,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => DEFAULT_MODEL,
            Provider::OpenAi => OPENAI_DEFAULT_MODEL,
        }
    }

    fn key_var(self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

#[derive(Clone)]
pub struct Settings {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, so tests need not touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("LLM_PROVIDER") {
            Some(p) => p.parse()?,
            None => Provider::Gemini,
        };
        let api_key = get(provider.key_var()).ok_or_else(|| {
            WorkflowError::InvalidConfig(format!("{} is not set", provider.key_var()))
        })?;
        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                WorkflowError::InvalidConfig(format!("LLM_TIMEOUT_SECS '{}' is not a number", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let settings = Self {
            provider,
            api_key,
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| provider.default_base_url().to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Build an [`ExecCtx`] for these settings.
    pub fn into_ctx(self) -> Result<ExecCtx> {
        let builder = ExecCtx::builder(self.base_url)
            .model(self.model)
            .timeout(self.timeout);
        let builder = match self.provider {
            Provider::Gemini => builder.gemini(self.api_key),
            #[cfg(feature = "openai")]
            Provider::OpenAi => builder.openai_with_key(self.api_key),
            #[cfg(not(feature = "openai"))]
            Provider::OpenAi => {
                return Err(WorkflowError::InvalidConfig(
                    "LLM_PROVIDER=openai requires the 'openai' feature".to_string(),
                ))
            }
        };
        builder.build()
    }
}
