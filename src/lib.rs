//! # LLM Workflows
//!
//! Typed, schema-checked LLM calls and the workflow patterns built from them.
//!
//! Each model call is a [`Stage<T>`]: it sends a response schema derived from
//! `T` and fails the run with [`WorkflowError::SchemaMismatch`] when the reply
//! does not deserialize into `T`. Orchestrators compose stages:
//!
//! - **[`CalendarChain`]**: extract, gate on confidence, parse details,
//!   confirm. Three calls in sequence, short-circuited by the gate.
//! - **[`CalendarRouter`]**: classify the request, gate on confidence,
//!   dispatch to the new-event or modify-event handler.
//! - **[`answer_with_tools`]**: let the model call local [`Tool`]s, then
//!   answer with a typed result.
//!
//! A gate stop is not an error. Orchestrators return an [`Outcome`]: either
//! `Completed(value)` or `Rejected(reason)`.
//!
//! ## Core Concepts
//!
//! - **[`ExecCtx`]**: shared execution context (HTTP client, backend,
//!   endpoint, default model, template variables, optional event handler).
//! - **[`Backend`]**: object-safe provider trait. [`GeminiBackend`] is the
//!   default; `OpenAiBackend` is behind the `openai` feature and
//!   [`MockBackend`] replays canned replies for tests.
//! - **[`Gate`]**: the confidence check, 0.7 by default and inclusive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use llm_workflows::{CalendarChain, ExecCtx, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
//!         .gemini(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!
//!     let input = "Let's schedule a 1h team meeting next Tuesday at 2pm with Alice and Bob.";
//!     match CalendarChain::new().process(&ctx, input).await? {
//!         Outcome::Completed(c) => println!("{}", c.confirmation_message),
//!         Outcome::Rejected(reason) => println!("Not a calendar event: {}", reason),
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod gate;
pub mod parsing;
pub mod prompt;
pub mod schema;
pub mod stage;
pub mod tools;
pub mod types;
pub mod workflows;

#[cfg(feature = "openai")]
pub use backend::OpenAiBackend;
pub use backend::{Backend, GeminiBackend, MockBackend};
pub use client::LlmConfig;
pub use config::{Provider, Settings};
pub use error::{Result, WorkflowError};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use gate::{Gate, DEFAULT_CONFIDENCE_THRESHOLD};
pub use stage::Stage;
pub use tools::{Tool, ToolRegistry};
pub use types::{Outcome, Rejection, StageOutput};
pub use workflows::{answer_with_tools, CalendarChain, CalendarRouter, ToolAnswer};
