//! Backend for the Gemini `generateContent` REST API.
//!
//! Endpoint: `POST {base}/v1beta/models/{model}:generateContent`.
//! Structured replies use `responseMimeType: "application/json"` plus a
//! `responseSchema`; tool use sends `tools[].functionDeclarations` and reads
//! `functionCall` parts back.

use super::{Backend, Content, FunctionCall, LlmRequest, LlmResponse, Part, Role};
use crate::error::Result;
use crate::WorkflowError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

/// Public base URL of the Gemini API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Backend for Google's Gemini API.
///
/// # Example
///
/// ```
/// use llm_workflows::backend::GeminiBackend;
///
/// let backend = GeminiBackend::new().with_api_key("AIza...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone, Default)]
pub struct GeminiBackend {
    /// API key, sent as the `x-goog-api-key` header.
    pub(crate) api_key: Option<String>,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GeminiBackend {
    /// Create a backend without an API key.
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn role_name(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    fn part_to_json(part: &Part) -> Value {
        match part {
            Part::Text(text) => json!({ "text": text }),
            Part::FunctionCall(call) => {
                let mut fc = json!({ "name": call.name, "args": call.args });
                if let Some(ref id) = call.id {
                    fc["id"] = json!(id);
                }
                json!({ "functionCall": fc })
            }
            Part::FunctionResponse(resp) => {
                let mut fr = json!({ "name": resp.name, "response": resp.response });
                if let Some(ref id) = resp.id {
                    fr["id"] = json!(id);
                }
                json!({ "functionResponse": fr })
            }
        }
    }

    fn content_to_json(content: &Content) -> Value {
        json!({
            "role": Self::role_name(content.role),
            "parts": content.parts.iter().map(Self::part_to_json).collect::<Vec<_>>(),
        })
    }

    /// Build the JSON body for `:generateContent`.
    fn build_body(request: &LlmRequest) -> Value {
        let mut body = json!({
            "contents": request.contents.iter().map(Self::content_to_json).collect::<Vec<_>>(),
        });

        if let Some(ref sys) = request.system_instruction {
            if !sys.is_empty() {
                body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
            }
        }

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        let mut generation = Map::new();
        if let Some(temp) = request.config.temperature {
            generation.insert("temperature".into(), json!(temp));
        }
        if let Some(max) = request.config.max_tokens {
            generation.insert("maxOutputTokens".into(), json!(max));
        }
        if let Some(ref schema) = request.response_schema {
            generation.insert("responseMimeType".into(), json!("application/json"));
            generation.insert("responseSchema".into(), schema.schema.clone());
        }
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }

        body
    }

    /// Normalize `candidates[0].content.parts` into [`Part`]s.
    fn parse_parts(json_resp: &Value) -> Vec<Part> {
        let Some(parts) = json_resp
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
        else {
            return Vec::new();
        };

        parts
            .iter()
            .filter_map(|part| {
                if let Some(fc) = part.get("functionCall") {
                    return Some(Part::FunctionCall(FunctionCall {
                        id: fc.get("id").and_then(|v| v.as_str()).map(String::from),
                        name: fc
                            .get("name")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        args: fc.get("args").cloned().unwrap_or_else(|| json!({})),
                    }));
                }
                part.get("text")
                    .and_then(|t| t.as_str())
                    .map(|t| Part::Text(t.to_string()))
            })
            .collect()
    }

    /// Extract metadata fields from a Gemini response.
    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = Map::new();
        if let Some(v) = json_resp.get("usageMetadata") {
            meta.insert("usage".into(), v.clone());
        }
        if let Some(v) = json_resp.get("modelVersion") {
            meta.insert("model".into(), v.clone());
        }
        if let Some(v) = json_resp
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("finishReason"))
        {
            meta.insert("finish_reason".into(), v.clone());
        }
        if let Some(v) = json_resp.get("promptFeedback") {
            meta.insert("prompt_feedback".into(), v.clone());
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{}/v1beta/models/{}:generateContent", base, request.model);
        let body = Self::build_body(request);

        let mut req = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.header("x-goog-api-key", key.as_str());
        }

        let resp = req.send().await.map_err(|e| {
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
        "gemini"
    }
}
