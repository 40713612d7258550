//! Mock backend for testing without a live LLM.
//!
//! [`MockBackend`] returns pre-configured replies in order and records every
//! request it receives, so tests can assert both on workflow results and on
//! which stages were (or were not) called.
//!
//! # Example
//!
//! ```
//! use llm_workflows::backend::MockBackend;
//!
//! let mock = MockBackend::new(vec![r#"{"name": "Science Fair"}"#.to_string()]);
//! assert_eq!(mock.calls(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, LlmRequest, LlmResponse, Part};
use crate::error::Result;

/// A test backend that returns canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<Vec<Part>>,
    index: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockBackend {
    /// Create a mock backend with the given canned text replies.
    pub fn new(responses: Vec<String>) -> Self {
        Self::from_parts(
            responses
                .into_iter()
                .map(|text| vec![Part::Text(text)])
                .collect(),
        )
    }

    /// Create a mock backend whose replies may contain function calls.
    pub fn from_parts(replies: Vec<Vec<Part>>) -> Self {
        assert!(!replies.is_empty(), "MockBackend requires at least one reply");
        Self {
            replies,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same text.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    /// Snapshot of every request received, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> Vec<Part> {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        Ok(LlmResponse {
            parts: self.next_reply(),
            status: 200,
            metadata: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Content, FunctionCall};
    use serde_json::json;

    fn test_request() -> LlmRequest {
        LlmRequest {
            model: "test".to_string(),
            system_instruction: None,
            contents: vec![Content::user_text("test")],
            response_schema: None,
            tools: Vec::new(),
            config: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let mock = MockBackend::fixed("Hello!");
        let client = Client::new();
        let resp = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text(), "Hello!");
        assert_eq!(resp.status, 200);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let mock = MockBackend::new(vec!["first".into(), "second".into()]);
        let client = Client::new();
        let request = test_request();
        let r1 = mock.complete(&client, "http://unused", &request).await.unwrap();
        let r2 = mock.complete(&client, "http://unused", &request).await.unwrap();
        let r3 = mock.complete(&client, "http://unused", &request).await.unwrap();
        assert_eq!(r1.text(), "first");
        assert_eq!(r2.text(), "second");
        assert_eq!(r3.text(), "first"); // cycles
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_function_call_reply_and_request_log() {
        let mock = MockBackend::from_parts(vec![vec![Part::FunctionCall(FunctionCall {
            id: None,
            name: "get_weather".into(),
            args: json!({"latitude": 1.0, "longitude": 2.0}),
        })]]);
        let client = Client::new();
        let resp = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        assert_eq!(resp.function_calls().len(), 1);
        assert!(resp.text().is_empty());

        let log = mock.requests();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].model, "test");
    }
}
