//! CLI argument definitions using clap
//!
//! Commands:
//! - tagwire decode --union <email|note-state|user> [--config <path>]
//! - tagwire demo [--config <path>] [--latency-ms <ms>]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tagwire - tagged union codec for JSON values
#[derive(Parser, Debug)]
#[command(name = "tagwire")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one JSON object from stdin and write it back re-encoded
    Decode {
        /// Which registry to decode with
        #[arg(long = "union", value_enum)]
        target: Target,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the sample user / note scenario
    Demo {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated API latency in milliseconds
        #[arg(long, default_value_t = 500)]
        latency_ms: u64,
    },
}

/// Decode targets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// `UserEmail` union
    Email,
    /// `Loadable<Note>` union
    NoteState,
    /// `User` model with its nested unions
    User,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decode() {
        let cli = Cli::try_parse_from(["tagwire", "decode", "--union", "note-state"]).unwrap();
        match cli.command {
            Command::Decode { target, config } => {
                assert_eq!(target, Target::NoteState);
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_demo_defaults() {
        let cli = Cli::try_parse_from(["tagwire", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo { latency_ms: 500, .. }));
    }

    #[test]
    fn test_unknown_union_rejected() {
        assert!(Cli::try_parse_from(["tagwire", "decode", "--union", "bogus"]).is_err());
    }
}
