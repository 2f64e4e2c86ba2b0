//! Hunt Board - scavenger-hunt leaderboard
//!
//! A CLI tool that fetches scavenger-hunt submissions from a
//! spreadsheet-backed endpoint, scores every participant and prints
//! the ranked leaderboard.
//!
//! Exit codes:
//!   0 - Leaderboard shown
//!   1 - Fetch, parse or aggregation error, or invalid arguments

mod cli;
mod config;
mod error;
mod models;
mod report;
mod scoring;
mod source;
mod view;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DisplayConfig, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use view::{LeaderboardView, ViewState};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Hunt Board v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Leaderboard failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .hunt_board.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Set the endpoint and scoring policy for your feed.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Fetch, rank and show the leaderboard. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let endpoint = config
        .source
        .endpoint
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let source = source::open(&endpoint, config.source.timeout_seconds)
        .with_context(|| format!("Failed to open source {}", endpoint))?;

    let policy = config.scoring_policy();
    info!("Scoring policy: {}", policy);

    let view = LeaderboardView::new(source, policy);
    let show_progress = !args.quiet && config.display.format != OutputFormat::Json;

    // Initial load, then optional manual refreshes
    let state = refresh_with_progress(&view, show_progress).await;
    emit(&state, &config.display, args.output.as_deref(), args.interactive)?;

    if args.interactive {
        interactive_loop(&view, &config.display, show_progress).await?;
    }

    Ok(match view.state() {
        ViewState::Ready(_) => 0,
        _ => 1,
    })
}

/// Run one refresh cycle with a spinner while the board is loading.
async fn refresh_with_progress(view: &LeaderboardView, show_progress: bool) -> ViewState {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading leaderboard from {}", view.source_location()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let state = view.refresh().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    state
}

/// Read refresh / quit commands from stdin until quit or EOF.
async fn interactive_loop(
    view: &LeaderboardView,
    display: &DisplayConfig,
    show_progress: bool,
) -> Result<()> {
    println!("Press Enter (or `r`) to refresh, `q` to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "" | "r" | "refresh" => {
                let state = refresh_with_progress(view, show_progress).await;
                emit(&state, display, None, true)?;
            }
            "q" | "quit" | "exit" => break,
            other => warn!("Unknown command: {:?}", other),
        }
    }

    debug!("Leaving interactive mode");
    Ok(())
}

/// Print the state, or write it to `output`.
fn emit(
    state: &ViewState,
    display: &DisplayConfig,
    output: Option<&Path>,
    retry_hint: bool,
) -> Result<()> {
    let rendered = report::render(state, display, retry_hint)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write leaderboard to {}", path.display()))?;
            println!("✅ Leaderboard saved to: {}", path.display());
        }
        None => println!("{}", rendered.trim_end()),
    }

    if let ViewState::Error(ref message) = state {
        error!("{}", message);
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
