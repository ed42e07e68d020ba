//! demorec - turn decoded match replays into .rec recordings
//!
//! # Commands
//!
//! - `demorec encode` - Run an event stream through a session and write the
//!   per-round recordings plus analytics
//! - `demorec inspect` - Decode a `.rec` file and print a summary
//!
//! # Usage
//!
//! ```bash
//! # Writes output/match01/round1/t/<player>.rec, ..., output/match01/purchases.json
//! demorec encode match01.jsonl
//!
//! # Custom output root and settings
//! demorec encode match01.jsonl --output recordings --config demorec.toml
//!
//! # Look at the first 10 frames of a recording
//! demorec inspect output/match01/round1/t/alice.rec --frames 10
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

mod encode;
mod inspect;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// demorec - decoded replay to movement recordings
#[derive(Parser)]
#[command(name = "demorec")]
#[command(about = "Turn decoded match replays into per-round .rec recordings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an event stream into recordings and analytics
    Encode(encode::EncodeArgs),

    /// Decode a .rec file and print its contents
    Inspect(inspect::InspectArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(args) => encode::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
