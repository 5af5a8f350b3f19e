//! Command-line parsing for the exchange-rate source.
//!
//! Argument parsing and command dispatch stay apart from the stream logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "exrate", version, about = "Incremental daily exchange rates from exchangerate-api.com")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the config (an `api_key` must be present).
    Check(ConfigArgs),
    /// Print the stream catalog.
    Discover(ConfigArgs),
    /// Fetch records and print RECORD/STATE messages as JSON lines.
    Read(ReadArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Connector config JSON (`api_key`, `base_currency`, `start_date`).
    #[arg(long, value_name = "JSON")]
    pub config: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ReadArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// State JSON to resume from. Checkpoints are written back to it.
    #[arg(long, value_name = "JSON")]
    pub state: Option<PathBuf>,

    /// Ignore stored state and fetch everything since `start_date`.
    #[arg(long)]
    pub full_refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_with_state() {
        let cli = Cli::parse_from(["exrate", "read", "--config", "c.json", "--state", "s.json"]);
        match cli.command {
            Command::Read(args) => {
                assert_eq!(args.config.config, PathBuf::from("c.json"));
                assert_eq!(args.state, Some(PathBuf::from("s.json")));
                assert!(!args.full_refresh);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
