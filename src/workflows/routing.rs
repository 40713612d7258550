//! Routing: classify a calendar request, then dispatch to one handler.
//!
//! The router stage returns a [`RequestType`] and a confidence. Below the gate
//! threshold nothing else runs. Otherwise `new_event` and `modify_event` each
//! go to their own handler stage; any other type yields
//! [`Rejection::UnsupportedRoute`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::gate::Gate;
use crate::stage::Stage;
use crate::types::{Outcome, Rejection};

const WORKFLOW: &str = "calendar-router";

pub const ROUTER_INSTRUCTION: &str =
    "Determine if this is a request to create a new calendar event or modify an existing one.";

pub const NEW_EVENT_INSTRUCTION: &str = "Extract details for creating a new calendar event.";

pub const MODIFY_EVENT_INSTRUCTION: &str =
    "Extract details for modifying an existing calendar event.";

/// Kind of calendar request. Unknown tags deserialize as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    NewEvent,
    ModifyEvent,
    #[serde(other)]
    Other,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::NewEvent => "new_event",
            RequestType::ModifyEvent => "modify_event",
            RequestType::Other => "other",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Router call: the type of calendar request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalendarRequestType {
    /// Type of calendar request being made
    pub request_type: RequestType,
    /// Confidence score between 0 and 1
    pub confidence_score: f64,
    /// Cleaned description of the request
    pub description: String,
}

/// Details for creating a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewEventDetails {
    /// Name of the event
    pub name: String,
    /// Date and time of the event (ISO 8601)
    pub date: String,
    /// Duration in minutes
    pub duration_minutes: i64,
    /// List of participants
    pub participants: Vec<String>,
}

/// One field change on an existing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Change {
    /// Field to change
    pub field: String,
    /// New value for the field
    pub new_value: String,
}

/// Details for modifying an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModifyEventDetails {
    /// Description to identify the existing event
    pub event_identifier: String,
    /// List of changes to make
    pub changes: Vec<Change>,
    /// New participants to add
    pub participants_to_add: Vec<String>,
    /// Participants to remove
    pub participants_to_remove: Vec<String>,
}

/// Final response of either handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalendarResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// User-friendly response message
    pub message: String,
    /// Calendar link if applicable
    #[serde(deserialize_with = "crate::schema::required_nullable")]
    #[schemars(schema_with = "crate::schema::nullable_string")]
    pub calendar_link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CalendarRouter {
    router: Stage<CalendarRequestType>,
    new_event: Stage<NewEventDetails>,
    modify_event: Stage<ModifyEventDetails>,
    gate: Gate,
}

impl Default for CalendarRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarRouter {
    pub fn new() -> Self {
        Self {
            router: Stage::new("route-calendar-request", ROUTER_INSTRUCTION),
            new_event: Stage::new("handle-new-event", NEW_EVENT_INSTRUCTION),
            modify_event: Stage::new("handle-modify-event", MODIFY_EVENT_INSTRUCTION),
            gate: Gate::default(),
        }
    }

    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Use `model` for the router and both handlers.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.router = self.router.with_model(model.clone());
        self.new_event = self.new_event.with_model(model.clone());
        self.modify_event = self.modify_event.with_model(model);
        self
    }

    pub async fn route_request(&self, ctx: &ExecCtx, input: &str) -> Result<CalendarRequestType> {
        info!("Routing calendar request");
        let result = self.router.run(ctx, input).await?.output;
        info!(
            request_type = %result.request_type,
            confidence = result.confidence_score,
            "Request routed"
        );
        Ok(result)
    }

    pub async fn handle_new_event(&self, ctx: &ExecCtx, description: &str) -> Result<CalendarResponse> {
        info!("Processing new event request");
        let details = self.new_event.run(ctx, description).await?.output;
        let summary = serde_json::to_string(&details)?;
        info!(details = %summary, "New event");

        Ok(CalendarResponse {
            success: true,
            message: format!(
                "Created new event '{}' for {} with {}",
                details.name,
                details.date,
                details.participants.join(", ")
            ),
            calendar_link: Some(format!("calendar://new?event={}", details.name)),
        })
    }

    pub async fn handle_modify_event(
        &self,
        ctx: &ExecCtx,
        description: &str,
    ) -> Result<CalendarResponse> {
        info!("Processing event modification request");
        let details = self.modify_event.run(ctx, description).await?.output;
        let summary = serde_json::to_string(&details)?;
        info!(details = %summary, "Modified event");

        Ok(CalendarResponse {
            success: true,
            message: format!(
                "Modified event '{}' with the requested changes",
                details.event_identifier
            ),
            calendar_link: Some(format!(
                "calendar://modify?event={}",
                details.event_identifier
            )),
        })
    }

    /// Route, gate and dispatch. At most one handler runs.
    pub async fn process(&self, ctx: &ExecCtx, input: &str) -> Result<Outcome<CalendarResponse>> {
        info!("Processing calendar request");
        let route = self.route_request(ctx, input).await?;

        if let Err(rejection) = self.gate.check_confidence(route.confidence_score) {
            warn!(confidence = route.confidence_score, "Low confidence score");
            return Ok(self.reject(ctx, rejection));
        }

        let response = match route.request_type {
            RequestType::NewEvent => {
                self.routed(ctx, &route);
                self.handle_new_event(ctx, &route.description).await?
            }
            RequestType::ModifyEvent => {
                self.routed(ctx, &route);
                self.handle_modify_event(ctx, &route.description).await?
            }
            RequestType::Other => {
                warn!(request_type = %route.request_type, "Request type not supported");
                return Ok(self.reject(
                    ctx,
                    Rejection::UnsupportedRoute {
                        request_type: route.request_type.to_string(),
                    },
                ));
            }
        };
        Ok(Outcome::Completed(response))
    }

    fn routed(&self, ctx: &ExecCtx, route: &CalendarRequestType) {
        emit(
            &ctx.event_handler,
            Event::Routed {
                request_type: route.request_type.to_string(),
                confidence: route.confidence_score,
            },
        );
    }

    fn reject(&self, ctx: &ExecCtx, rejection: Rejection) -> Outcome<CalendarResponse> {
        emit(
            &ctx.event_handler,
            Event::GateRejected {
                workflow: WORKFLOW,
                rejection: rejection.clone(),
            },
        );
        Outcome::Rejected(rejection)
    }
}
