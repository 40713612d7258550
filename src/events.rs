//! Event system for stage and workflow lifecycle hooks.
//!
//! Provides an optional, non-intrusive way to observe workflow execution.
//! Stages emit events when they start and finish, orchestrators emit gate and
//! routing decisions, and the tool loop reports each tool invocation. Users
//! can implement [`EventHandler`] for progress tracking or test assertions;
//! plain logging goes through `tracing` regardless.

use crate::types::Rejection;
use std::sync::Arc;

/// Events emitted during workflow execution.
#[derive(Debug, Clone)]
pub enum Event {
    /// A stage is about to call the model.
    StageStart {
        /// Stage name.
        name: String,
        /// Name of the declared output schema.
        schema: String,
    },
    /// A stage has finished (successfully or not).
    StageEnd {
        /// Stage name.
        name: String,
        /// Whether the reply conformed to the schema.
        ok: bool,
    },
    /// A gate stopped a workflow.
    GateRejected {
        /// Workflow name (e.g. `"calendar-chain"`).
        workflow: &'static str,
        /// Why the gate stopped the run.
        rejection: Rejection,
    },
    /// A routing stage picked a handler.
    Routed {
        /// The discriminant returned by the router.
        request_type: String,
        /// Router confidence.
        confidence: f64,
    },
    /// A local tool was executed on the model's request.
    ToolInvoked {
        /// Tool name.
        name: String,
        /// Whether execution succeeded.
        ok: bool,
    },
}

/// Handler for workflow lifecycle events.
///
/// This is entirely optional -- workflows run without an event handler.
///
/// # Example
///
/// ```
/// use llm_workflows::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::StageStart { name, .. } => println!("[start] {}", name),
///             Event::StageEnd { name, ok } => println!("[end] {} ok={}", name, ok),
///             _ => {} // GateRejected, Routed, ToolInvoked
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when a workflow component emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use llm_workflows::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::GateRejected { rejection, .. } = event {
///         eprintln!("stopped: {}", rejection);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_without_handler_is_noop() {
        emit(
            &None,
            Event::StageEnd {
                name: "x".into(),
                ok: true,
            },
        );
    }

    #[test]
    fn test_fn_handler_receives_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Option<Arc<dyn EventHandler>> =
            Some(Arc::new(FnEventHandler(move |event: Event| {
                if let Event::StageStart { name, .. } = event {
                    sink.lock().unwrap().push(name);
                }
            })));

        emit(
            &handler,
            Event::StageStart {
                name: "extract".into(),
                schema: "EventExtraction".into(),
            },
        );
        assert_eq!(*seen.lock().unwrap(), vec!["extract".to_string()]);
    }
}
