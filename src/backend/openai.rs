//! Backend for OpenAI-compatible chat completion APIs.
//!
//! Endpoint: `/v1/chat/completions` (always chat mode).
//! Structured replies use `response_format: {"type": "json_schema"}`; tool
//! use sends `tools[]` and maps `tool_calls` back to [`Part::FunctionCall`].

use super::{Backend, Content, FunctionCall, LlmRequest, LlmResponse, Part, Role};
use crate::error::Result;
use crate::WorkflowError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Backend for any OpenAI-compatible API.
///
/// # Example
///
/// ```
/// use llm_workflows::backend::OpenAiBackend;
///
/// let backend = OpenAiBackend::new();
/// let with_key = OpenAiBackend::new().with_api_key("sk-...");
/// ```
#[derive(Clone)]
pub struct OpenAiBackend {
    /// Optional API key. If set, sent as `Authorization: Bearer {key}`.
    pub(crate) api_key: Option<String>,
    /// Optional organization ID. If set, sent as `OpenAI-Organization: {org}`.
    pub(crate) organization: Option<String>,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|k| {
                    if k.chars().count() > 6 {
                        format!("{}***", k.chars().take(6).collect::<String>())
                    } else {
                        "***".to_string()
                    }
                }),
            )
            .field("organization", &self.organization)
            .finish()
    }
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend without authentication.
    pub fn new() -> Self {
        Self {
            api_key: None,
            organization: None,
        }
    }

    /// Set the API key for authentication.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the organization ID header.
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Translate one transcript turn into chat messages.
    ///
    /// A turn may expand into several messages: function responses become one
    /// `tool` message each.
    fn content_to_messages(content: &Content, out: &mut Vec<Value>) {
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();

        match content.role {
            Role::User => {
                if !text.is_empty() {
                    out.push(json!({"role": "user", "content": text}));
                }
                for part in &content.parts {
                    if let Part::FunctionResponse(resp) = part {
                        out.push(json!({
                            "role": "tool",
                            "tool_call_id": resp.id.clone().unwrap_or_else(|| resp.name.clone()),
                            "content": resp.response.to_string(),
                        }));
                    }
                }
            }
            Role::Model => {
                let calls: Vec<Value> = content
                    .parts
                    .iter()
                    .filter_map(|p| match p {
                        Part::FunctionCall(call) => Some(json!({
                            "id": call.id.clone().unwrap_or_else(|| call.name.clone()),
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.args.to_string(),
                            },
                        })),
                        _ => None,
                    })
                    .collect();
                let mut msg = json!({"role": "assistant"});
                msg["content"] = if text.is_empty() { Value::Null } else { json!(text) };
                if !calls.is_empty() {
                    msg["tool_calls"] = json!(calls);
                }
                out.push(msg);
            }
        }
    }

    /// Build the messages array for the OpenAI request.
    fn build_messages(request: &LlmRequest) -> Vec<Value> {
        let mut messages = Vec::new();

        if let Some(ref sys) = request.system_instruction {
            if !sys.is_empty() {
                messages.push(json!({"role": "system", "content": sys}));
            }
        }

        for content in &request.contents {
            Self::content_to_messages(content, &mut messages);
        }

        messages
    }

    /// Build the request body for `/v1/chat/completions`.
    fn build_body(request: &LlmRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": Self::build_messages(request),
        });

        if let Some(temp) = request.config.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max) = request.config.max_tokens {
            body["max_tokens"] = json!(max);
        }

        if let Some(ref schema) = request.response_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {"name": schema.name, "schema": schema.schema},
            });
        }

        if !request.tools.is_empty() {
            body["tools"] = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        },
                    })
                })
                .collect();
        }

        body
    }

    /// Build the reqwest request with appropriate headers.
    fn build_http_request(
        &self,
        client: &Client,
        url: &str,
        body: &Value,
    ) -> reqwest::RequestBuilder {
        let mut req = client.post(url).json(body);

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        if let Some(ref org) = self.organization {
            req = req.header("OpenAI-Organization", org.as_str());
        }

        req
    }

    /// Normalize `choices[0].message` into [`Part`]s.
    fn parse_parts(json_resp: &Value) -> Vec<Part> {
        let Some(message) = json_resp
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
        else {
            return Vec::new();
        };

        let mut parts = Vec::new();
        if let Some(text) = message.get("content").and_then(|v| v.as_str()) {
            if !text.is_empty() {
                parts.push(Part::Text(text.to_string()));
            }
        }
        if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
            for call in calls {
                let function = &call["function"];
                let arguments = function
                    .get("arguments")
                    .and_then(|v| v.as_str())
                    .unwrap_or("{}");
                parts.push(Part::FunctionCall(FunctionCall {
                    id: call.get("id").and_then(|v| v.as_str()).map(String::from),
                    name: function
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    args: serde_json::from_str(arguments)
                        .unwrap_or_else(|_| Value::String(arguments.to_string())),
                }));
            }
        }
        parts
    }

    /// Extract metadata from an OpenAI response.
    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        if let Some(v) = json_resp.get("usage") {
            meta.insert("usage".into(), v.clone());
        }
        if let Some(v) = json_resp.get("model") {
            meta.insert("model".into(), v.clone());
        }
        if let Some(v) = json_resp.get("id") {
            meta.insert("id".into(), v.clone());
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{}/v1/chat/completions", base);
        let body = Self::build_body(request);

        let resp = self
            .build_http_request(client, &url, &body)
            .send()
            .await
            .map_err(|e| {
                WorkflowError::Other(format!("Failed to connect to LLM at {}: {}", url, e))
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(super::http_error(resp).await);
        }

        let json_resp: Value = resp.json().await?;
        Ok(LlmResponse {
            parts: Self::parse_parts(&json_resp),
            status,
            metadata: Self::extract_metadata(&json_resp),
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
