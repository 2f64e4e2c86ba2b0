//! Leaderboard rendering.
//!
//! Turns the current view state into a plain-text table, a Markdown table,
//! or JSON.

use crate::cli::OutputFormat;
use crate::config::DisplayConfig;
use crate::models::{Leaderboard, RankedEntry};
use crate::view::ViewState;
use anyhow::Result;
use serde_json::json;

/// Shown instead of rows when nobody has submitted anything.
const EMPTY_MESSAGE: &str = "No participants yet";

/// Render a view state in the configured format.
///
/// `retry_hint` adds a line telling the user how to retry after an error.
pub fn render(state: &ViewState, display: &DisplayConfig, retry_hint: bool) -> Result<String> {
    Ok(match display.format {
        OutputFormat::Json => generate_json(state)?,
        OutputFormat::Markdown => match state {
            ViewState::Ready(board) => generate_markdown(board, display),
            _ => generate_status(state, &display.title, retry_hint),
        },
        OutputFormat::Table => match state {
            ViewState::Ready(board) => generate_table(board, &display.title),
            _ => generate_status(state, &display.title, retry_hint),
        },
    })
}

/// Marker for the podium places.
pub fn rank_marker(rank: usize) -> &'static str {
    match rank {
        1 => "🏆",
        2 => "🥈",
        3 => "🥉",
        _ => "",
    }
}

/// Loading or error text.
fn generate_status(state: &ViewState, title: &str, retry_hint: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n\n", title));

    match state {
        ViewState::Loading => output.push_str("Loading leaderboard...\n"),
        ViewState::Error(message) => {
            output.push_str(&format!("Error: {}\n", message));
            if retry_hint {
                output.push_str("Press Enter to retry.\n");
            }
        }
        ViewState::Ready(_) => {}
    }

    output
}

/// Generate a plain-text table.
fn generate_table(board: &Leaderboard, title: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", title));
    output.push_str("Current Leaderboard\n\n");

    if board.is_empty() {
        output.push_str(&format!("{}\n", EMPTY_MESSAGE));
        return output;
    }

    let name_width = board
        .entries
        .iter()
        .map(|e| e.participant_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Participant".len());
    let points: Vec<String> = board.entries.iter().map(RankedEntry::points_display).collect();
    let points_width = points
        .iter()
        .map(|p| p.len())
        .max()
        .unwrap_or(0)
        .max("Points".len());

    output.push_str(&format!(
        "{:<7} {:<name_width$} {:>points_width$}\n",
        "Rank", "Participant", "Points"
    ));
    output.push_str(&format!(
        "{} {} {}\n",
        "-".repeat(7),
        "-".repeat(name_width),
        "-".repeat(points_width)
    ));

    for (entry, points) in board.entries.iter().zip(&points) {
        let rank = format!("{:>3} {}", entry.rank, rank_marker(entry.rank));
        output.push_str(&format!(
            "{:<7} {:<name_width$} {:>points_width$}\n",
            rank.trim_end(),
            entry.participant_id,
            points
        ));
    }

    output.push_str(&format!(
        "\n{} participants from {} submissions ({})\n",
        board.entries.len(),
        board.records_seen,
        board.policy
    ));

    output
}

/// Generate a Markdown table.
fn generate_markdown(board: &Leaderboard, display: &DisplayConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", display.title));
    output.push_str(&format!(
        "*Current Leaderboard, updated {}*\n\n",
        board.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if board.is_empty() {
        output.push_str(&format!("{}\n", EMPTY_MESSAGE));
        return output;
    }

    let avatars = display.avatar_url_template.as_deref();
    if avatars.is_some() {
        output.push_str("| Rank | Avatar | Participant | Points |\n");
        output.push_str("|:---:|:---:|:---|---:|\n");
    } else {
        output.push_str("| Rank | Participant | Points |\n");
        output.push_str("|:---:|:---|---:|\n");
    }

    for entry in &board.entries {
        let rank = format!("{} {}", entry.rank, rank_marker(entry.rank));
        let rank = rank.trim_end();
        match avatars {
            Some(template) => output.push_str(&format!(
                "| {} | ![{}]({}) | {} | **{}** |\n",
                rank,
                entry.participant_id,
                avatar_url(template, &entry.participant_id),
                entry.participant_id,
                entry.points_display()
            )),
            None => output.push_str(&format!(
                "| {} | {} | **{}** |\n",
                rank,
                entry.participant_id,
                entry.points_display()
            )),
        }
    }
    output.push('\n');

    output
}

/// Fill a `{participant}` placeholder.
pub fn avatar_url(template: &str, participant: &str) -> String {
    template.replace("{participant}", participant)
}

/// Generate a JSON document for any state.
fn generate_json(state: &ViewState) -> Result<String> {
    let value = match state {
        ViewState::Loading => json!({ "status": "loading" }),
        ViewState::Error(message) => json!({ "status": "error", "message": message }),
        ViewState::Ready(board) => json!({
            "status": "ready",
            "policy": board.policy,
            "recordsSeen": board.records_seen,
            "generatedAt": board.generated_at,
            "entries": board.entries,
        }),
    };
    serde_json::to_string_pretty(&value).map_err(Into::into)
}
