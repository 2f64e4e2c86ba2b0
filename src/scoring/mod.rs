//! Scoring: turns raw submissions into a ranked leaderboard.

pub mod aggregator;

pub use aggregator::aggregate;
