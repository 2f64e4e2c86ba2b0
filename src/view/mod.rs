//! View state for the leaderboard.

pub mod state;

pub use state::{LeaderboardView, ViewState};
