//! # litrank CLI
//!
//! Command-line interface for the litrank research entity store.
//!
//! This binary provides human-friendly access to `litrank-core`.
//! Run `litrank --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
