//! Execution context shared across stage invocations.
//!
//! [`ExecCtx`] carries the HTTP client, model backend, endpoint, default model,
//! template variables and optional event handler. It is constructed once and
//! shared by every stage of a workflow run.

use crate::backend::{Backend, GeminiBackend};
#[cfg(feature = "openai")]
use crate::backend::OpenAiBackend;
use crate::error::Result;
use crate::events::EventHandler;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Model used when neither the stage nor the context names one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Template variable holding the current date for stage instructions.
pub const TODAY_VAR: &str = "today";

/// Shared execution context for stage invocations.
///
/// # Example
///
/// ```
/// use llm_workflows::ExecCtx;
///
/// let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
///     .gemini("AIza...")
///     .var("today", "Tuesday, March 04, 2025")
///     .build()
///     .unwrap();
/// assert_eq!(ctx.today(), "Tuesday, March 04, 2025");
/// ```
pub struct ExecCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL for the LLM provider.
    pub base_url: String,
    /// LLM backend. Default: [`GeminiBackend`] without a key.
    pub backend: Arc<dyn Backend>,
    /// Model used by stages that do not set their own.
    pub model: String,
    /// Template variables substituted into instruction `{key}` placeholders.
    pub vars: HashMap<String, String>,
    /// Optional event handler for lifecycle events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: base_url.into(),
            backend: None,
            model: None,
            vars: HashMap::new(),
            event_handler: None,
            timeout: None,
        }
    }

    /// The current date as shown to the model, e.g. `"Tuesday, March 04, 2025"`.
    ///
    /// Uses the `today` template variable when set, otherwise the local date.
    pub fn today(&self) -> String {
        self.vars
            .get(TODAY_VAR)
            .cloned()
            .unwrap_or_else(|| chrono::Local::now().format("%A, %B %d, %Y").to_string())
    }

    /// Template variables with `today` always present.
    pub fn template_vars(&self) -> HashMap<String, String> {
        let mut vars = self.vars.clone();
        vars.entry(TODAY_VAR.to_string())
            .or_insert_with(|| self.today());
        vars
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("vars_count", &self.vars.len())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    model: Option<String>,
    vars: HashMap<String, String>,
    event_handler: Option<Arc<dyn EventHandler>>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the LLM backend. Default: [`GeminiBackend`].
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the Gemini backend with the given API key.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(GeminiBackend::new().with_api_key(api_key)));
        self
    }

    /// Use the OpenAI-compatible backend with API key authentication.
    #[cfg(feature = "openai")]
    pub fn openai_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(OpenAiBackend::new().with_api_key(api_key)));
        self
    }

    /// Set the default model. Default: [`DEFAULT_MODEL`].
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set all template variables at once.
    pub fn vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Insert a single template variable.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set the request timeout. Default: 60 seconds.
    ///
    /// Ignored when a custom `Client` is provided via `.client()`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> Result<ExecCtx> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(Duration::from_secs(60)))
                .build()?,
        };
        Ok(ExecCtx {
            client,
            base_url: normalize_base_url(&self.base_url),
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(GeminiBackend::new())),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vars: self.vars,
            event_handler: self.event_handler,
        })
    }
}

/// Strip known provider path suffixes from a base URL.
/// This prevents double-pathing when backends append their own paths.
/// e.g., "https://api.openai.com/v1" -> "https://api.openai.com"
/// e.g., "https://generativelanguage.googleapis.com/v1beta" -> "https://generativelanguage.googleapis.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    // Longest first
    for suffix in &["/v1/chat/completions", "/v1beta/models", "/v1beta", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_strips_v1() {
        assert_eq!(normalize_base_url("https://api.openai.com/v1"), "https://api.openai.com");
        assert_eq!(normalize_base_url("https://api.openai.com/v1/"), "https://api.openai.com");
    }

    #[test]
    fn test_normalize_base_url_strips_v1beta() {
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/v1beta/models"),
            "https://generativelanguage.googleapis.com"
        );
    }

    #[test]
    fn test_normalize_base_url_strips_full_path() {
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1/chat/completions"),
            "https://api.openai.com"
        );
    }

    #[test]
    fn test_normalize_base_url_preserves_clean() {
        assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_defaults() {
        let ctx = ExecCtx::builder("http://test").build().unwrap();
        assert_eq!(ctx.backend.name(), "gemini");
        assert_eq!(ctx.model, DEFAULT_MODEL);
        assert!(ctx.event_handler.is_none());
    }

    #[test]
    fn test_today_override_and_template_vars() {
        let ctx = ExecCtx::builder("http://test")
            .var("today", "Friday, January 10, 2025")
            .var("store", "Acme")
            .build()
            .unwrap();
        assert_eq!(ctx.today(), "Friday, January 10, 2025");
        let vars = ctx.template_vars();
        assert_eq!(vars["today"], "Friday, January 10, 2025");
        assert_eq!(vars["store"], "Acme");
    }

    #[test]
    fn test_today_defaults_to_local_date() {
        let ctx = ExecCtx::builder("http://test").build().unwrap();
        let expected = chrono::Local::now().format("%A, %B %d, %Y").to_string();
        // Could straddle midnight; only check the shape when it does not match.
        let today = ctx.today();
        assert!(today == expected || today.contains(", "));
        assert!(ctx.template_vars().contains_key("today"));
    }

    #[test]
    fn test_custom_model_and_timeout() {
        let ctx = ExecCtx::builder("http://test")
            .model("gemini-1.5-pro")
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap();
        assert_eq!(ctx.model, "gemini-1.5-pro");
    }
}
