//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait is the model gateway: it translates a normalized
//! [`LlmRequest`] (system instruction, transcript, optional response schema,
//! optional function declarations) into a provider HTTP call and normalizes
//! the reply into [`Part`]s. Built-in implementations: [`GeminiBackend`],
//! [`OpenAiBackend`] (feature `openai`) and [`MockBackend`].
//!
//! ## Architecture
//!
//! ```text
//! Stage<T> ──► LlmRequest ──► Backend::complete() ──► LlmResponse ──► T
//!                                    │
//!                     ┌──────────────┼──────────────┐
//!               GeminiBackend   OpenAiBackend    MockBackend
//!            :generateContent  /v1/chat/completions  canned replies
//! ```

pub mod gemini;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
#[cfg(feature = "openai")]
pub use openai::OpenAiBackend;

use crate::client::LlmConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// A normalized, provider-agnostic LLM request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model identifier (e.g. `"gemini-2.0-flash"`, `"gpt-4o-mini"`).
    pub model: String,

    /// System instruction, already rendered.
    pub system_instruction: Option<String>,

    /// The conversation transcript for this call, oldest first.
    pub contents: Vec<Content>,

    /// If set, the provider is asked to reply with JSON matching this schema.
    pub response_schema: Option<ResponseSchema>,

    /// Functions the model may ask to have executed instead of answering.
    pub tools: Vec<FunctionDeclaration>,

    /// Generation settings (temperature, max tokens).
    pub config: LlmConfig,
}

/// A named JSON schema for structured replies.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Schema name (the Rust type name). Required by OpenAI-style APIs.
    pub name: String,
    /// The schema body.
    pub schema: Value,
}

/// A callable function the model may request.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// The author of a [`Content`] turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// User input, including function results sent back to the model.
    User,
    /// Model output, including function-call requests.
    Model,
}

/// One turn of a conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A user turn carrying function results.
    pub fn function_responses(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: Role::User,
            parts: responses.into_iter().map(Part::FunctionResponse).collect(),
        }
    }

    /// A model turn carrying function-call requests.
    pub fn function_calls(calls: Vec<FunctionCall>) -> Self {
        Self {
            role: Role::Model,
            parts: calls.into_iter().map(Part::FunctionCall).collect(),
        }
    }
}

/// A piece of a [`Content`] turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

/// A request from the model to execute a local function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Provider call id, when the provider assigns one (OpenAI does, Gemini may not).
    pub id: Option<String>,
    pub name: String,
    /// Arguments object.
    pub args: Value,
}

/// The result of executing a [`FunctionCall`], sent back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

/// A normalized LLM response.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Reply parts in provider order.
    pub parts: Vec<Part>,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token counts, model version, finish reason).
    pub metadata: Option<Value>,
}

impl LlmResponse {
    /// Build a response holding a single text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(text.into())],
            status: 200,
            metadata: None,
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Function calls requested by the model, in order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

/// Abstraction over LLM providers.
///
/// Implementors translate between the normalized [`LlmRequest`]/[`LlmResponse`]
/// and the provider's HTTP API. A single blocking-style call per request;
/// there is no retry layer.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute one model call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Read a non-success HTTP reply into [`WorkflowError::HttpError`](crate::WorkflowError::HttpError).
pub(crate) async fn http_error(resp: reqwest::Response) -> crate::WorkflowError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    crate::WorkflowError::HttpError { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_text_joins_text_parts() {
        let resp = LlmResponse {
            parts: vec![
                Part::Text("Hello, ".into()),
                Part::FunctionCall(FunctionCall {
                    id: None,
                    name: "get_weather".into(),
                    args: json!({}),
                }),
                Part::Text("world".into()),
            ],
            status: 200,
            metadata: None,
        };
        assert_eq!(resp.text(), "Hello, world");
        assert_eq!(resp.function_calls().len(), 1);
        assert_eq!(resp.function_calls()[0].name, "get_weather");
    }

    #[test]
    fn test_content_constructors() {
        let user = Content::user_text("hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.parts, vec![Part::Text("hi".into())]);

        let calls = Content::function_calls(vec![FunctionCall {
            id: Some("call_1".into()),
            name: "search_kb".into(),
            args: json!({"question": "q"}),
        }]);
        assert_eq!(calls.role, Role::Model);

        let responses = Content::function_responses(vec![FunctionResponse {
            id: Some("call_1".into()),
            name: "search_kb".into(),
            response: json!({"result": []}),
        }]);
        assert_eq!(responses.role, Role::User);
        assert!(matches!(responses.parts[0], Part::FunctionResponse(_)));
    }
}
