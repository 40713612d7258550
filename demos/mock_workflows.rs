//! Example: run the chain and the router offline against `MockBackend`.
//!
//! Run with: `cargo run --example mock_workflows`

use std::sync::Arc;

use llm_workflows::events::{Event, FnEventHandler};
use llm_workflows::{CalendarChain, CalendarRouter, ExecCtx, MockBackend, Outcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let printer = Arc::new(FnEventHandler(|event: Event| match event {
        Event::StageStart { name, schema } => println!("  [start] {} -> {}", name, schema),
        Event::StageEnd { name, ok } => println!("  [end]   {} ok={}", name, ok),
        Event::GateRejected { workflow, rejection } => {
            println!("  [gate]  {} stopped: {}", workflow, rejection)
        }
        Event::Routed {
            request_type,
            confidence,
        } => println!("  [route] {} ({:.2})", request_type, confidence),
        Event::ToolInvoked { name, ok } => println!("  [tool]  {} ok={}", name, ok),
    }));

    // Chain: extraction, details, confirmation.
    let chain_mock = Arc::new(MockBackend::new(vec![
        r#"{"description": "Team meeting next Tuesday at 2pm with Alice and Bob", "is_calendar_event": true, "confidence_score": 0.92}"#.to_string(),
        r#"{"name": "Team Meeting", "date": "2025-01-14T14:00:00", "duration_minutes": 60, "participants": ["Alice", "Bob"]}"#.to_string(),
        r#"{"confirmation_message": "Team Meeting with Alice and Bob is booked for Tuesday at 2pm. Susie", "calendar_link": null}"#.to_string(),
    ]));
    let ctx = ExecCtx::builder("http://unused")
        .backend(chain_mock.clone())
        .var("today", "Friday, January 10, 2025")
        .event_handler(printer.clone())
        .build()?;

    println!("Prompt chain:");
    if let Outcome::Completed(c) = CalendarChain::new().process(&ctx, "team meeting").await? {
        println!("  {}", c.confirmation_message);
    }
    println!("  model calls: {}", chain_mock.calls());

    // Router: a request it does not handle.
    let router_mock = Arc::new(MockBackend::fixed(
        r#"{"request_type": "other", "confidence_score": 0.97, "description": "Weather question"}"#,
    ));
    let ctx = ExecCtx::builder("http://unused")
        .backend(router_mock.clone())
        .event_handler(printer)
        .build()?;

    println!("Router:");
    let outcome = CalendarRouter::new()
        .process(&ctx, "What's the weather like today?")
        .await?;
    println!("  completed: {}", outcome.is_completed());
    println!("  model calls: {}", router_mock.calls());
    Ok(())
}
