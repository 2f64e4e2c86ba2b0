//! Data models for the leaderboard.
//!
//! Raw submission records as they arrive from the feed, the scoring policy
//! that turns them into points, and the ranked result handed to the renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points awarded per submitted task when no other value is configured.
pub const DEFAULT_POINTS_PER_TASK: u32 = 10;

/// One submission event from the spreadsheet feed.
///
/// Every field is optional here. Whether a field is required depends on the
/// active [`ScoringPolicy`], and a missing field is reported by the
/// aggregator rather than by the JSON parser. A field that is present with
/// the wrong JSON type still fails parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// ISO-8601 time the submission was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Stable participant key. Older feeds call it `openmrsId`.
    #[serde(default, alias = "openmrsId", skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,

    /// Identifier of the completed task (task-count feeds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<serde_json::Number>,

    /// Points carried by this submission (latest-score feeds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RawRecord {
    /// Build a task-count record.
    #[cfg(test)]
    pub fn task(participant: &str, task_id: u64) -> Self {
        Self {
            timestamp: Some("2025-01-01T00:00:00Z".to_string()),
            participant_id: Some(participant.to_string()),
            task_id: Some(task_id.into()),
            score: None,
        }
    }

    /// Build a latest-score record.
    #[cfg(test)]
    pub fn scored(participant: &str, timestamp: &str, score: f64) -> Self {
        Self {
            timestamp: Some(timestamp.to_string()),
            participant_id: Some(participant.to_string()),
            task_id: None,
            score: Some(score),
        }
    }
}

/// Which scoring rule a deployment uses.
///
/// The two feeds carry different fields and are never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Fixed points for every submitted task
    #[default]
    TaskCount,
    /// Score of each participant's most recent submission
    LatestScore,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::TaskCount => write!(f, "task-count"),
            PolicyKind::LatestScore => write!(f, "latest-score"),
        }
    }
}

/// Fully configured aggregation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScoringPolicy {
    /// Every record is one task worth `points_per_task`.
    TaskCount { points_per_task: u32 },
    /// A participant's points are the `score` of their latest record.
    LatestScore,
}

impl ScoringPolicy {
    pub fn new(kind: PolicyKind, points_per_task: u32) -> Self {
        match kind {
            PolicyKind::TaskCount => ScoringPolicy::TaskCount { points_per_task },
            PolicyKind::LatestScore => ScoringPolicy::LatestScore,
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::TaskCount {
            points_per_task: DEFAULT_POINTS_PER_TASK,
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringPolicy::TaskCount { points_per_task } => {
                write!(f, "task-count ({} points per task)", points_per_task)
            }
            ScoringPolicy::LatestScore => write!(f, "latest-score"),
        }
    }
}

/// One participant's row on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// Participant key, unique within one result.
    pub participant_id: String,
    /// Non-negative point total.
    pub points: f64,
    /// 1-based position, no gaps.
    pub rank: usize,
}

impl RankedEntry {
    /// Points without a trailing `.0` for whole numbers.
    pub fn points_display(&self) -> String {
        if self.points.fract() == 0.0 && self.points.abs() < 1e15 {
            format!("{:.0}", self.points)
        } else {
            self.points.to_string()
        }
    }
}

/// Result of one successful refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Policy the entries were scored with.
    pub policy: ScoringPolicy,
    /// Ranked participants, rank 1 first.
    pub entries: Vec<RankedEntry>,
    /// Number of raw records the entries were built from.
    pub records_seen: usize,
    /// When the cycle settled.
    pub generated_at: DateTime<Utc>,
}

impl Leaderboard {
    pub fn new(policy: ScoringPolicy, entries: Vec<RankedEntry>, records_seen: usize) -> Self {
        Self {
            policy,
            entries,
            records_seen,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_accepts_legacy_participant_key() {
        let json = r#"{"timestamp":"2025-01-01T10:00:00Z","openmrsId":"alice","taskId":3}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.participant_id.as_deref(), Some("alice"));
        assert_eq!(record.task_id, Some(serde_json::Number::from(3u64)));
        assert_eq!(record.score, None);
    }

    #[test]
    fn test_raw_record_missing_fields_parse() {
        let record: RawRecord = serde_json::from_str(r#"{"participantId":"bob"}"#).unwrap();
        assert_eq!(record.participant_id.as_deref(), Some("bob"));
        assert!(record.timestamp.is_none());
        assert!(record.score.is_none());
    }

    #[test]
    fn test_raw_record_wrong_type_fails() {
        let result = serde_json::from_str::<RawRecord>(r#"{"participantId":"bob","score":"8"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_from_kind() {
        assert_eq!(
            ScoringPolicy::new(PolicyKind::TaskCount, 5),
            ScoringPolicy::TaskCount { points_per_task: 5 }
        );
        assert_eq!(
            ScoringPolicy::new(PolicyKind::LatestScore, 5),
            ScoringPolicy::LatestScore
        );
        assert_eq!(
            ScoringPolicy::default(),
            ScoringPolicy::TaskCount { points_per_task: 10 }
        );
    }

    #[test]
    fn test_points_display() {
        let mut entry = RankedEntry {
            participant_id: "alice".to_string(),
            points: 20.0,
            rank: 1,
        };
        assert_eq!(entry.points_display(), "20");

        entry.points = 7.5;
        assert_eq!(entry.points_display(), "7.5");
    }

    #[test]
    fn test_ranked_entry_serializes_camel_case() {
        let entry = RankedEntry {
            participant_id: "alice".to_string(),
            points: 8.0,
            rank: 1,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"participantId\":\"alice\""));
        assert!(json.contains("\"rank\":1"));
    }
}
