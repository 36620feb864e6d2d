// ⚙️ Configuration - command line and environment
//
// Both binaries share FeedArgs. `Config` is the resolved form handed to the
// application layers; nothing below the CLI reads arguments or env directly.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default feed locations, one per branch
pub const DEFAULT_FEEDS: [&str; 3] = ["api/branch1.json", "api/branch2.json", "api/branch3.json"];

/// Default API bind address
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// What to do when a branch feed cannot be read or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFeedPolicy {
    /// Abort the load; no report is built
    #[default]
    Fail,
    /// Use an explicit empty feed for that branch
    Skip,
}

#[derive(Debug, Clone, Args)]
pub struct FeedArgs {
    /// Branch feed file (.json or .csv); repeat once per branch
    #[arg(short = 'f', long = "feed", value_name = "PATH")]
    pub feeds: Vec<PathBuf>,

    /// Replace unreadable feeds with an empty feed instead of aborting
    #[arg(long)]
    pub skip_missing: bool,
}

#[derive(Debug, Parser)]
#[command(name = "revenue-aggregator", version, about = "Merge branch sales feeds into one revenue report")]
pub struct Cli {
    #[command(flatten)]
    pub feeds: FeedArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Print the revenue report
    Report {
        /// Only show products whose name contains this text
        #[arg(short, long, default_value = "")]
        query: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Interactive report with live search
    Tui,
}

#[derive(Debug, Parser)]
#[command(name = "revenue-server", version, about = "Serve the revenue report over HTTP")]
pub struct ServerCli {
    #[command(flatten)]
    pub feeds: FeedArgs,

    /// Address to listen on
    #[arg(long, env = "REVENUE_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub feeds: Vec<PathBuf>,
    pub missing_feed: MissingFeedPolicy,
    pub bind: String,
}

impl Config {
    pub fn from_feed_args(args: &FeedArgs) -> Result<Self> {
        if args.feeds.iter().any(|f| f.as_os_str().is_empty()) {
            bail!("feed path must not be empty");
        }

        let feeds = if args.feeds.is_empty() {
            DEFAULT_FEEDS.iter().map(PathBuf::from).collect()
        } else {
            args.feeds.clone()
        };

        Ok(Config {
            feeds,
            missing_feed: if args.skip_missing {
                MissingFeedPolicy::Skip
            } else {
                MissingFeedPolicy::Fail
            },
            bind: DEFAULT_BIND.to_string(),
        })
    }

    pub fn from_server_cli(cli: &ServerCli) -> Result<Self> {
        let mut config = Config::from_feed_args(&cli.feeds)?;
        config.bind = cli.bind.clone();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_three_branch_feeds() {
        let cli = Cli::try_parse_from(["revenue-aggregator"]).unwrap();
        let config = Config::from_feed_args(&cli.feeds).unwrap();

        assert_eq!(config.feeds.len(), 3);
        assert_eq!(config.feeds[0], PathBuf::from("api/branch1.json"));
        assert_eq!(config.missing_feed, MissingFeedPolicy::Fail);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_report_subcommand_with_query() {
        let cli = Cli::try_parse_from([
            "revenue-aggregator",
            "--skip-missing",
            "--feed",
            "north.json",
            "-f",
            "south.csv",
            "report",
            "--query",
            "apple",
            "--json",
        ])
        .unwrap();
        let config = Config::from_feed_args(&cli.feeds).unwrap();

        assert_eq!(
            config.feeds,
            vec![PathBuf::from("north.json"), PathBuf::from("south.csv")]
        );
        assert_eq!(config.missing_feed, MissingFeedPolicy::Skip);

        match cli.command {
            Some(Commands::Report { query, json }) => {
                assert_eq!(query, "apple");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_server_bind_override() {
        let cli = ServerCli::try_parse_from(["revenue-server", "--bind", "127.0.0.1:8080", "--feed", "a.json"]).unwrap();
        let config = Config::from_server_cli(&cli).unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.feeds, vec![PathBuf::from("a.json")]);
    }

    #[test]
    fn test_rejects_blank_feed_path() {
        let args = FeedArgs {
            feeds: vec![PathBuf::new()],
            skip_missing: false,
        };
        assert!(Config::from_feed_args(&args).is_err());
    }
}
