//! `search_kb`: a static question/answer knowledge base loaded from JSON.
//!
//! The file has the shape `{"records": [{"id", "question", "answer"}, ...]}`.
//! There is no search: every lookup returns all records and the model picks
//! the relevant one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::Tool;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub records: Vec<KbRecord>,
}

impl KnowledgeBase {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn get(&self, id: i64) -> Option<&KbRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// Final answer of the knowledge-base assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KbResponse {
    /// The answer to the user's question.
    pub answer: String,
    /// The record id of the answer
    pub source: i64,
}

/// Reads the knowledge base file on every call.
pub struct SearchKbTool {
    path: PathBuf,
}

impl SearchKbTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Tool for SearchKbTool {
    fn name(&self) -> &str {
        "search_kb"
    }

    fn description(&self) -> &str {
        "Get the answer to the user's question from the knowledge base."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The user's question to search for in the knowledge base"
                }
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let question = args.get("question").and_then(Value::as_str).unwrap_or("");
        debug!(question, path = %self.path.display(), "Loading knowledge base");
        let kb = KnowledgeBase::load(&self.path).await?;
        Ok(serde_json::to_value(kb)?)
    }
}
