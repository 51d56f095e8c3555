//! CLI module for tagwire
//!
//! Provides command-line interface for:
//! - decode: decode and re-encode one JSON object from stdin
//! - demo: run the sample user / note scenario

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Target};
pub use commands::{decode, decode_value, demo, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_debug, write_error, write_response, write_section};
