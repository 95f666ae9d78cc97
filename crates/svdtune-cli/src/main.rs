//! svdtune CLI - Interactive SVD compression tuning
//!
//! svdtune drives a running SVD compression server: pick `k` with a
//! compression-rate slider or a preset, and watch the recompressed image and
//! its statistics follow once input settles.
//!
//! ## Quick Start
//!
//! ```bash
//! # Upload an image and tune it interactively
//! svdtune tune --upload ./photo.jpg
//!
//! # What k does a 90% rate give?
//! svdtune k --rate 90
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

use anyhow::Result;
use clap::Parser;

mod commands;
pub mod ui;

use commands::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::K(args) => commands::k::run(args).await,
        Command::Preview(args) => commands::preview::run(args).await,
        Command::Recompress(args) => commands::recompress::run(args).await,
        Command::Tune(args) => commands::tune::run(args).await,
        Command::Config(args) => commands::config::run(args).await,
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,svdtune=info,svdtune_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
