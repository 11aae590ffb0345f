//! jsync demonstration runner
//!
//! Saves a sample object graph to a JSON file, loads it back into a fresh
//! instance and logs both.
//!
//! Usage:
//!   jsync-demo line --out out.json
//!   jsync-demo animals --compact
//!   jsync-demo zoo --indent 2 --verbose

use std::path::PathBuf;
use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use jsync_core::DocumentFormat;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// A line between two points
    Line,
    /// A polymorphic list of animals
    Animals,
    /// A polymorphic map of animals keyed by enclosure
    Zoo,
}

#[derive(Parser, Debug)]
#[command(name = "jsync-demo")]
#[command(about = "Save and reload sample object graphs with jsync")]
struct Args {
    /// Object graph to run
    #[arg(value_enum, default_value = "line")]
    scenario: Scenario,

    /// File the document is written to and read back from
    #[arg(short, long, default_value = "out.json")]
    out: PathBuf,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Spaces per indent level for pretty output
    #[arg(long, default_value = "4")]
    indent: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let format = if args.compact {
        DocumentFormat::compact()
    } else {
        DocumentFormat::pretty(args.indent)
    };

    let outcome = match args.scenario {
        Scenario::Line => jsync_demo::run_line(&args.out, &format)?,
        Scenario::Animals => jsync_demo::run_animals(&args.out, &format)?,
        Scenario::Zoo => jsync_demo::run_zoo(&args.out, &format)?,
    };

    if !outcome.matches() {
        bail!(
            "reloaded graph differs: saved {:?}, loaded {:?}",
            outcome.saved,
            outcome.loaded
        );
    }
    info!(path = %args.out.display(), "Round trip complete");
    Ok(())
}
