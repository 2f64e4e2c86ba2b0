//! Leaderboard output.

pub mod generator;

pub use generator::render;
