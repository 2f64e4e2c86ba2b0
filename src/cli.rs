//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::PolicyKind;
use crate::source;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hunt Board - scavenger-hunt leaderboard
///
/// Fetches submission records from a spreadsheet-backed endpoint, scores
/// every participant and prints the ranking.
///
/// Examples:
///   hunt_board --endpoint https://script.google.com/macros/s/ID/exec
///   hunt_board --endpoint https://example.com/exec --policy latest-score
///   hunt_board --input fixtures/task_records.json --format markdown
///   hunt_board --endpoint https://example.com/exec --interactive
///   hunt_board --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Submission feed URL
    ///
    /// Must answer a GET with a JSON array of submission records.
    /// Can also be set via HUNT_BOARD_ENDPOINT or .hunt_board.toml.
    #[arg(short, long, value_name = "URL", env = "HUNT_BOARD_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Read submissions from a local JSON file instead of the endpoint
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Scoring policy for this feed
    #[arg(short, long, value_name = "POLICY")]
    pub policy: Option<PolicyKind>,

    /// Points awarded per submitted task (task-count policy)
    #[arg(long, value_name = "POINTS")]
    pub points_per_task: Option<u32>,

    /// Output format (table, markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Board title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Write the leaderboard to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    ///
    /// Without a timeout a hung request keeps the board loading.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .hunt_board.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep running and refresh on demand
    ///
    /// Press Enter (or type `r`) to refresh, `q` to quit.
    #[arg(long, conflicts_with = "output")]
    pub interactive: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .hunt_board.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the leaderboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text table (default)
    #[default]
    Table,
    /// Markdown table
    Markdown,
    /// JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // --input replaces the endpoint, so a stale HUNT_BOARD_ENDPOINT is ignored.
        if let (Some(endpoint), None) = (&self.endpoint, &self.input) {
            if !source::is_supported_location(endpoint) {
                return Err(
                    "Endpoint URL must start with 'http://', 'https://' or 'file://'".to_string(),
                );
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        if self.points_per_task == Some(0) {
            return Err("Points per task must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
