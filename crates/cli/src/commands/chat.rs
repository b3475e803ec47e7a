//! `causerie chat` — Send a single message and print the answer.

use causerie_config::AppConfig;
use causerie_core::{ChatId, StreamEvent, TurnContent};
use std::io::Write;

pub async fn run(
    id: &str,
    message: &str,
    tools: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let engine = super::build_engine(&config)?;

    // Print token deltas as they arrive; send_message returns the full turn
    // once the stream has ended.
    let mut events = engine.hub().subscribe().await;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Stream { content } => {
                    print!("{content}");
                    let _ = std::io::stdout().flush();
                }
                StreamEvent::StreamEnd { .. } => {
                    println!();
                    break;
                }
            }
        }
    });

    let chat_id = ChatId::from(id);
    let turn = engine.send_message(&chat_id, message, &tools).await?;
    let _ = printer.await;

    if let TurnContent::Grounded(answer) = &turn.content {
        println!("\nSources:");
        for excerpt in &answer.context {
            println!("  [{}] {}", excerpt.source, excerpt.content);
        }
    }

    Ok(())
}
