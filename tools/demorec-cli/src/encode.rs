//! Encode command - event stream to recordings

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};

use demorec_core::{EventStream, FsStore, Session, SessionConfig, SessionReport};

/// Arguments for the encode command
#[derive(Args)]
pub struct EncodeArgs {
    /// Decoded event stream (JSON Lines)
    pub stream: PathBuf,

    /// Output root; files go to <OUTPUT>/<NAME>/
    #[arg(short, long, env = "DEMOREC_OUTPUT_DIR", default_value = "output")]
    pub output: PathBuf,

    /// Match name (defaults to the stream file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Session settings (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute the encode command
pub fn execute(args: EncodeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let name = match args.name {
        Some(name) => name,
        None => match_name(&args.stream)?,
    };
    let out_dir = args.output.join(&name);

    let report = run(&args.stream, &out_dir, config)?;

    println!();
    println!("=== Encoding Complete ===");
    println!("Output: {}", out_dir.display());
    println!("Rounds: {}", report.rounds);
    println!("Recordings: {}", report.recordings_written);
    println!("Chat messages: {}", report.chat_messages);
    if let Some(estimate) = report.frame_rate {
        println!(
            "Frame rate: {:.1} fps ({:?})",
            estimate.effective_fps, estimate.cadence
        );
    }
    if report.write_failures > 0 {
        println!("Write failures: {} (see log)", report.write_failures);
    }

    Ok(())
}

/// Run a whole stream into `out_dir`.
pub fn run(stream: &Path, out_dir: &Path, config: SessionConfig) -> Result<SessionReport> {
    let events = EventStream::open(stream)
        .with_context(|| format!("Failed to open event stream: {}", stream.display()))?;

    tracing::info!(stream = %stream.display(), output = %out_dir.display(), "encoding");
    let mut session = Session::new(config, FsStore::new(out_dir));
    session
        .run(events)
        .with_context(|| format!("Failed to read event stream: {}", stream.display()))?;
    Ok(session.finish())
}

fn match_name(stream: &Path) -> Result<String> {
    match stream.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => bail!(
            "Cannot derive a match name from {}; pass --name",
            stream.display()
        ),
    }
}
