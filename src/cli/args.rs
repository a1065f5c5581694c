//! CLI argument definitions using clap
//!
//! Commands:
//! - agromart serve [--config <path>]
//! - agromart check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agromart - produce, routes and retailers matched in one process
#[derive(Parser, Debug)]
#[command(name = "agromart")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve JSON requests from stdin, one per line
    Serve {
        /// Path to configuration file; built-in defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a configuration file and print it with defaults filled in
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./agromart.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_without_config() {
        let cli = Cli::try_parse_from(["agromart", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { config: None }));
    }

    #[test]
    fn test_check_config_path() {
        let cli =
            Cli::try_parse_from(["agromart", "check-config", "--config", "/tmp/a.json"]).unwrap();
        match cli.command {
            Command::CheckConfig { config } => assert_eq!(config, PathBuf::from("/tmp/a.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
