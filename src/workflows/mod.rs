//! Ready-made workflows built from [`Stage`](crate::Stage)s.
//!
//! - [`extract`]: one schema-constrained call.
//! - [`tools`]: a function-calling round trip with local tools.
//! - [`chaining`]: three stages in sequence behind a confidence gate.
//! - [`routing`]: a classifier stage that dispatches to one of two handlers.

pub mod chaining;
pub mod extract;
pub mod routing;
pub mod tools;

pub use chaining::{CalendarChain, EventConfirmation, EventDetails, EventExtraction};
pub use extract::{extract_calendar_event, CalendarEvent};
pub use routing::{
    CalendarRequestType, CalendarResponse, CalendarRouter, Change, ModifyEventDetails,
    NewEventDetails, RequestType,
};
pub use tools::{answer_with_tools, ask_knowledge_base, ask_weather, ToolAnswer};
