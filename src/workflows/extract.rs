//! Single-call structured extraction: free text in, one [`CalendarEvent`] out.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::stage::Stage;

pub const EXTRACT_INSTRUCTION: &str = "Extract the event information.";

/// An event pulled out of free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalendarEvent {
    /// Name of the event
    pub name: String,
    /// Date of the event
    pub date: String,
    /// People attending the event
    pub participants: Vec<String>,
}

pub fn calendar_event_stage() -> Stage<CalendarEvent> {
    Stage::new("extract-event", EXTRACT_INSTRUCTION)
}

/// Pull a [`CalendarEvent`] out of free text in a single call.
pub async fn extract_calendar_event(ctx: &ExecCtx, text: &str) -> Result<CalendarEvent> {
    Ok(calendar_event_stage().run(ctx, text).await?.output)
}
