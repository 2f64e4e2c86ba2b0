//! Error types for the fetch / aggregate cycle.

use thiserror::Error;

/// Errors that end a leaderboard refresh cycle.
///
/// Every variant renders to a single human-readable message, which is what
/// the view state stores on failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LeaderboardError {
    /// Transport failure or a non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// Response body is not JSON or does not match the record shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// A record lacks a field the active scoring policy needs.
    #[error("aggregation error: record {index}: {reason}")]
    Aggregation {
        /// Zero-based position of the offending record in the fetched list.
        index: usize,
        /// What was missing or invalid.
        reason: String,
    },
}

impl LeaderboardError {
    pub fn aggregation(index: usize, reason: impl Into<String>) -> Self {
        Self::Aggregation {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LeaderboardError::Network("HTTP 500 Internal Server Error".to_string());
        assert_eq!(err.to_string(), "network error: HTTP 500 Internal Server Error");

        let err = LeaderboardError::aggregation(3, "missing field `score`");
        assert_eq!(
            err.to_string(),
            "aggregation error: record 3: missing field `score`"
        );
    }
}
