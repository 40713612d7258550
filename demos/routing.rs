//! Example: route calendar requests to the new-event or modify-event handler.
//!
//! Run with: `GEMINI_API_KEY=... cargo run --example routing`

use llm_workflows::{CalendarRouter, Outcome, Settings};

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
    let router = CalendarRouter::new();

    let inputs = [
        "Let's schedule a team meeting next Tuesday at 2pm with Alice and Bob",
        "Can you move the team meeting with Alice and Bob to Wednesday at 3pm instead?",
        "What's the weather like today?",
    ];

    for input in inputs {
        match router.process(&ctx, input).await? {
            Outcome::Completed(response) => println!("Response: {}", response.message),
            Outcome::Rejected(reason) => {
                println!("Request not recognized as a calendar operation ({})", reason)
            }
        }
    }
    Ok(())
}
