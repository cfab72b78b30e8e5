//! Palisade CLI — the main entry point.
//!
//! Commands:
//! - `ask`  — Resolve a single question and print the answer
//! - `chat` — Interactive session on stdin
//! - `scan` — Run the content-safety scanner over a piece of text

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "palisade",
    about = "Palisade — tiered conversational resolution engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Override the resolution mode (local, hybrid, external)
    #[arg(short, long, global = true)]
    mode: Option<String>,

    /// Override the answer language
    #[arg(short, long, global = true)]
    lang: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single question and print the answer
    Ask {
        /// The question to resolve
        question: String,
    },

    /// Interactive chat session
    Chat,

    /// Scan text with the content-safety scanner and print the verdict
    Scan {
        /// The text to scan
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.mode, cli.lang)?;

    match cli.command {
        Commands::Ask { question } => commands::ask::run(&config, &question).await?,
        Commands::Chat => commands::chat::run(&config).await?,
        Commands::Scan { text } => commands::scan::run(&config, &text)?,
    }

    Ok(())
}
