//! Example: three-stage prompt chain with a confidence gate.
//!
//! Run with: `GEMINI_API_KEY=... cargo run --example prompt_chaining`

use llm_workflows::{CalendarChain, Outcome, Settings};

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
    let chain = CalendarChain::new();

    let inputs = [
        "Let's schedule a 1h team meeting next Tuesday at 2pm with Alice and Bob to discuss the project roadmap.",
        "Can you send an email to Alice and Bob to discuss the project roadmap?",
    ];

    for input in inputs {
        match chain.process(&ctx, input).await? {
            Outcome::Completed(confirmation) => {
                println!("Confirmation: {}", confirmation.confirmation_message);
                if let Some(link) = confirmation.calendar_link {
                    println!("Calendar Link: {}", link);
                }
            }
            Outcome::Rejected(reason) => {
                println!("This doesn't appear to be a calendar event request ({}).", reason);
            }
        }
    }
    Ok(())
}
