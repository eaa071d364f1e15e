//! REX CLI - inspect and unpack REX container files
//!
//! # Commands
//!
//! - `rex info` - print file metadata, coordinate system and a block summary
//! - `rex unpack` - write embedded image blocks out as individual files
//!
//! # Usage
//!
//! ```bash
//! # Summarize a file
//! rex info scene.rex
//!
//! # Same summary as JSON (for scripting)
//! rex info scene.rex --json
//!
//! # Extract all embedded images
//! rex unpack scene.rex --out textures/
//! ```

mod info;
mod unpack;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Inspection tool for REX container files
#[derive(Parser)]
#[command(name = "rex")]
#[command(about = "Inspect and unpack REX container files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print file metadata, coordinate system and a per-block summary
    Info(info::InfoArgs),

    /// Write embedded image blocks out as individual files
    Unpack(unpack::UnpackArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Unpack(args) => unpack::execute(args),
    }
}
