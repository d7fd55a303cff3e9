//! # imgstamp CLI
//!
//! Renders every job described in the configuration file.
//!
//! ## Usage
//!
//! ```bash
//! # Use ./config.yaml (or .yml/.json), write into ./out_<timestamp>/
//! imgstamp
//!
//! # Explicit config and output root
//! imgstamp --config jobs/badges.json --out-root renders
//!
//! # More detail
//! RUST_LOG=debug imgstamp
//! ```

use chrono::Local;
use clap::Parser;
use std::path::PathBuf;

use imgstamp::{Config, StampError, batch, fsutil};

/// imgstamp - stamp text, QR codes and images onto base images
#[derive(Parser, Debug)]
#[command(name = "imgstamp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config.yaml, config.yml or config.json in the working directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory in which the timestamped output directory is created
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_root: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), StampError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(".")?,
    };

    // Every job is checked before anything is drawn.
    config.check_params()?;

    let out_dir = cli.out_root.join(fsutil::output_dir_name(&Local::now()));
    fsutil::create_dir(&out_dir);

    batch::run_batch(&config, &out_dir);
    Ok(())
}
