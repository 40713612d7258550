//! Prompt chaining with a gate.
//!
//! ```text
//! input -> extract_event_info -> [gate] -> parse_event_details -> generate_confirmation
//!                                  |
//!                                  +-> Outcome::Rejected
//! ```
//!
//! Stage 1 decides whether the text describes a calendar event. Only when it
//! does, with confidence at or above the gate threshold, do stages 2 and 3 run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::gate::Gate;
use crate::stage::Stage;
use crate::types::Outcome;

const WORKFLOW: &str = "calendar-chain";

pub const EXTRACT_INSTRUCTION: &str =
    "Today is {today}. Analyze if the text describes a calendar event.";

pub const DETAILS_INSTRUCTION: &str = "Today is {today}. Extract detailed event information. When dates reference 'next Tuesday' or similar relative dates, use this current date as reference.";

pub const CONFIRM_INSTRUCTION: &str =
    "Generate a natural confirmation message for the event. Sign off with your name; Susie";

/// First call: basic event information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventExtraction {
    /// Raw description of the event
    pub description: String,
    /// Whether this text describes a calendar event
    pub is_calendar_event: bool,
    /// Confidence score between 0 and 1
    pub confidence_score: f64,
}

/// Second call: specific event details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventDetails {
    /// Name of the event
    pub name: String,
    /// Date and time of the event. Use ISO 8601 to format this value.
    pub date: String,
    /// Expected duration in minutes
    pub duration_minutes: i64,
    /// List of participants
    pub participants: Vec<String>,
}

/// Third call: confirmation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventConfirmation {
    /// Natural language confirmation message
    pub confirmation_message: String,
    /// Generated calendar link if applicable
    #[serde(deserialize_with = "crate::schema::required_nullable")]
    #[schemars(schema_with = "crate::schema::nullable_string")]
    pub calendar_link: Option<String>,
}

/// Three-stage calendar chain behind a confidence gate.
#[derive(Debug, Clone)]
pub struct CalendarChain {
    extract: Stage<EventExtraction>,
    details: Stage<EventDetails>,
    confirm: Stage<EventConfirmation>,
    gate: Gate,
}

impl Default for CalendarChain {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarChain {
    pub fn new() -> Self {
        Self {
            extract: Stage::new("extract-event-info", EXTRACT_INSTRUCTION),
            details: Stage::new("parse-event-details", DETAILS_INSTRUCTION),
            confirm: Stage::new("generate-confirmation", CONFIRM_INSTRUCTION),
            gate: Gate::default(),
        }
    }

    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Use `model` for all three stages.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.extract = self.extract.with_model(model.clone());
        self.details = self.details.with_model(model.clone());
        self.confirm = self.confirm.with_model(model);
        self
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub async fn extract_event_info(&self, ctx: &ExecCtx, input: &str) -> Result<EventExtraction> {
        info!("Starting event extraction analysis");
        let result = self.extract.run(ctx, input).await?.output;
        info!(
            is_calendar_event = result.is_calendar_event,
            confidence = result.confidence_score,
            description = %result.description,
            "Extraction complete"
        );
        Ok(result)
    }

    pub async fn parse_event_details(&self, ctx: &ExecCtx, description: &str) -> Result<EventDetails> {
        info!("Starting event details parsing");
        let result = self.details.run(ctx, description).await?.output;
        info!(
            name = %result.name,
            date = %result.date,
            duration_minutes = result.duration_minutes,
            "Parsed event details"
        );
        debug!(participants = %result.participants.join(", "), "Participants");
        Ok(result)
    }

    /// Stage 3 receives the details serialized as JSON.
    pub async fn generate_confirmation(
        &self,
        ctx: &ExecCtx,
        details: &EventDetails,
    ) -> Result<EventConfirmation> {
        info!("Generating confirmation message");
        let input = serde_json::to_string(details)?;
        let result = self.confirm.run(ctx, &input).await?.output;
        info!("Confirmation message generated successfully");
        Ok(result)
    }

    /// Run the whole chain.
    ///
    /// Returns `Outcome::Rejected` when the gate stops the run; a stage reply
    /// that does not match its schema is an error.
    pub async fn process(&self, ctx: &ExecCtx, input: &str) -> Result<Outcome<EventConfirmation>> {
        info!("Processing calendar request");
        debug!(input, "Raw input");

        let extraction = self.extract_event_info(ctx, input).await?;

        if let Err(rejection) = self
            .gate
            .check(extraction.is_calendar_event, extraction.confidence_score)
        {
            warn!(
                is_calendar_event = extraction.is_calendar_event,
                confidence = format_args!("{:.2}", extraction.confidence_score),
                "Gate check failed"
            );
            emit(
                &ctx.event_handler,
                Event::GateRejected {
                    workflow: WORKFLOW,
                    rejection: rejection.clone(),
                },
            );
            return Ok(Outcome::Rejected(rejection));
        }

        info!("Gate check passed, proceeding with event processing");

        let details = self.parse_event_details(ctx, &extraction.description).await?;
        let confirmation = self.generate_confirmation(ctx, &details).await?;

        info!("Calendar request processing completed successfully");
        Ok(Outcome::Completed(confirmation))
    }
}
