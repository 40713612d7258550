//! Example: pull a typed event out of free text with one schema-constrained call.
//!
//! Run with: `GEMINI_API_KEY=... cargo run --example structured_output`

use llm_workflows::workflows::extract_calendar_event;
use llm_workflows::Settings;

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

    let ctx = Settings::from_env()?.into_ctx()?;

    let event =
        extract_calendar_event(&ctx, "Alice and Bob are going to a science fair on Friday").await?;

    println!("Name: {}", event.name);
    println!("Date: {}", event.date);
    println!("Participants: {}", event.participants.join(", "));
    Ok(())
}
