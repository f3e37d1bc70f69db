// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # c3dcodec CLI
//!
//! Command-line tool for decoding C3D biomechanics captures.
//!
//! ## Usage
//!
//! ```sh
//! # Show capture metadata
//! c3dcodec inspect info walk01.c3d
//!
//! # List output columns
//! c3dcodec inspect channels walk01.c3d
//!
//! # Decode and write JSON
//! c3dcodec decode walk01.c3d --output walk01.json
//!
//! # Decode a whole session in parallel
//! c3dcodec batch session/*.c3d
//! ```

mod cmd;
mod common;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use cmd::{BatchCmd, DecodeCmd, InspectCmd};
use common::Result;
use tracing_subscriber::EnvFilter;

/// c3dcodec - Biomechanics capture decoder
///
/// Splits C3D files into synchronized motion-capture and force-plate
/// tables and reports their metadata.
#[derive(Parser, Clone)]
#[command(name = "c3dcodec")]
#[command(about = "Decode C3D motion-capture and force-plate data", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Decode options file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect capture metadata and channels
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Decode one capture into tables
    Decode(DecodeCmd),

    /// Decode many captures in parallel
    Batch(BatchCmd),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = common::load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(options),
        Commands::Decode(cmd) => cmd.run(options),
        Commands::Batch(cmd) => cmd.run(options),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
