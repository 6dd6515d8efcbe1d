//! sfdb - a simple FreeDB/CDDB lookup client.
//!
//! Looks up album and track metadata for a CD from its table-of-contents
//! fingerprint (disc id, frame offsets, total playtime). The protocol
//! core lives in [`cddb`]; the CLI is a thin harness around it.

pub mod cddb;
pub mod cli;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("sfdb=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
