//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status. Decode
//! failures of the input itself are not CLI errors; they are reported as
//! an error response on stdout.

use std::io;

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty input")]
    EmptyInput,

    /// A registry or schema could not be built
    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

impl CliError {
    /// Stable error code for stderr output
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "TAGWIRE_CLI_CONFIG_ERROR",
            CliError::Io(_) | CliError::Json(_) | CliError::EmptyInput => "TAGWIRE_CLI_IO_ERROR",
            CliError::Codec(err) => err.code(),
            CliError::Runtime(_) => "TAGWIRE_CLI_RUNTIME_ERROR",
        }
    }
}
