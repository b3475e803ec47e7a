//! Causerie CLI — the main entry point.
//!
//! Commands:
//! - `init`   — Create the app-data tree and a default config file
//! - `chat`   — Send a single message to a conversation
//! - `serve`  — Start the WebSocket gateway
//! - `models` — List models installed on the Ollama runtime

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "causerie",
    about = "Causerie — local-first conversational engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the app-data directories and a default config file
    Init,

    /// Send one message to a conversation and print the answer
    Chat {
        /// Conversation id (created on first use)
        #[arg(short, long)]
        id: String,

        /// The message to send
        message: String,

        /// Augmentation tools to apply (e.g. "search")
        #[arg(short, long)]
        tool: Vec<String>,
    },

    /// Start the WebSocket gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List models installed on the Ollama runtime
    Models,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat { id, message, tool } => commands::chat::run(&id, &message, tool).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Models => commands::models::run().await?,
    }

    Ok(())
}
