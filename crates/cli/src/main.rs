//! docfox CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive chat or single-message mode
//! - `status` — Show configuration and capability status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "docfox",
    about = "docfox — grounded study-assistant agent",
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
    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Session id to continue (defaults to a fresh session)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show configuration and capability status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message, session } => commands::chat::run(message, session).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
