//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hunt_board.toml` files.

use crate::cli::{Args, OutputFormat};
use crate::models::{PolicyKind, ScoringPolicy, DEFAULT_POINTS_PER_TASK};
use crate::source;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".hunt_board.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where submissions come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// How submissions turn into points.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// How the leaderboard is shown.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Submission feed settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Feed URL: `https://...` or a `file://` URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds. Unset means wait indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Active scoring policy.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Points per submitted task under `task-count`.
    #[serde(default = "default_points_per_task")]
    pub points_per_task: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            points_per_task: default_points_per_task(),
        }
    }
}

fn default_points_per_task() -> u32 {
    DEFAULT_POINTS_PER_TASK
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Board title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Avatar image URL with a `{participant}` placeholder (Markdown only).
    #[serde(default)]
    pub avatar_url_template: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            format: OutputFormat::default(),
            avatar_url_template: None,
        }
    }
}

fn default_title() -> String {
    "Scavenger Hunt".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.hunt_board.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref input) = args.input {
            self.source.endpoint = Some(format!("file://{}", input.display()));
        } else if let Some(ref endpoint) = args.endpoint {
            self.source.endpoint = Some(endpoint.clone());
        }

        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = Some(timeout);
        }

        if let Some(policy) = args.policy {
            self.scoring.policy = policy;
        }
        if let Some(points) = args.points_per_task {
            self.scoring.points_per_task = points;
        }

        if let Some(format) = args.format {
            self.display.format = format;
        }
        if let Some(ref title) = args.title {
            self.display.title = title.clone();
        }
    }

    /// The scoring policy these settings describe.
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy::new(self.scoring.policy, self.scoring.points_per_task)
    }

    /// Check settings that no type can enforce.
    pub fn validate(&self) -> Result<()> {
        let endpoint = match self.source.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint,
            _ => anyhow::bail!(
                "No endpoint configured. Pass --endpoint, set HUNT_BOARD_ENDPOINT, \
                 or add `endpoint` under [source] in {}",
                CONFIG_FILE_NAME
            ),
        };
        if !source::is_supported_location(endpoint) {
            anyhow::bail!(
                "Endpoint `{}` must start with 'http://', 'https://' or 'file://' \
                 (use --input for a local path)",
                endpoint
            );
        }
        if self.scoring.points_per_task == 0 {
            anyhow::bail!("points_per_task must be at least 1");
        }
        if self.source.timeout_seconds == Some(0) {
            anyhow::bail!("timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config.source.endpoint =
            Some("https://script.google.com/macros/s/DEPLOYMENT_ID/exec".to_string());
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
