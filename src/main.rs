//! specgit: hidden version-control history for generated documentation
//!
//! Thin binary: parses arguments, initializes logging, and dispatches
//! to the library.

use anyhow::Result;
use clap::Parser;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use specgit::cli::Cli;

/// Initialize logging with RUST_LOG environment variable support
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    match specgit::cli::run(cli) {
        Ok(()) => Ok(()),
        Err(e) if e.is_abort() => {
            // A user-requested abort is not a failure, but the batch did
            // not complete
            eprintln!("Aborted");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
