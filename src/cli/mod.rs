//! Command-line interface for sfdb.
//!
//! Thin demo harness over the protocol core: parse arguments, run one
//! lookup, print the result. All protocol behavior lives in `cddb`.

mod commands;

pub use commands::{Cli, Commands, run_command};
