//! Submission aggregation and ranking.
//!
//! Collapses the raw submission list into one ranked entry per participant
//! under the configured [`ScoringPolicy`]. A single malformed record fails
//! the whole aggregation; a partial leaderboard is never returned.

use crate::error::LeaderboardError;
use crate::models::{RankedEntry, RawRecord, ScoringPolicy};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Aggregate raw records into a ranked leaderboard.
pub fn aggregate(
    records: &[RawRecord],
    policy: ScoringPolicy,
) -> Result<Vec<RankedEntry>, LeaderboardError> {
    let totals = match policy {
        ScoringPolicy::TaskCount { points_per_task } => task_count_points(records, points_per_task)?,
        ScoringPolicy::LatestScore => latest_score_points(records)?,
    };

    debug!(
        "Aggregated {} records into {} participants ({})",
        records.len(),
        totals.len(),
        policy
    );

    Ok(rank(totals))
}

/// Points per participant, in first-seen order: one task per record.
fn task_count_points(
    records: &[RawRecord],
    points_per_task: u32,
) -> Result<Vec<(String, f64)>, LeaderboardError> {
    let mut groups = Grouping::default();
    let mut counts: Vec<u64> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let participant = participant_of(index, record)?;
        if record.task_id.is_none() {
            return Err(LeaderboardError::aggregation(index, "missing field `taskId`"));
        }

        let slot = groups.slot(participant);
        if slot == counts.len() {
            counts.push(0);
        }
        counts[slot] += 1;
    }

    Ok(groups
        .into_participants()
        .into_iter()
        .zip(counts)
        .map(|(participant, count)| (participant, (count * u64::from(points_per_task)) as f64))
        .collect())
}

/// Points per participant, in first-seen order: score of the latest record.
fn latest_score_points(records: &[RawRecord]) -> Result<Vec<(String, f64)>, LeaderboardError> {
    let mut groups = Grouping::default();
    let mut latest: Vec<(DateTime<Utc>, f64)> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let participant = participant_of(index, record)?;

        let raw_timestamp = record
            .timestamp
            .as_deref()
            .ok_or_else(|| LeaderboardError::aggregation(index, "missing field `timestamp`"))?;
        let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| {
            LeaderboardError::aggregation(index, format!("invalid timestamp `{}`", raw_timestamp))
        })?;

        let score = record
            .score
            .ok_or_else(|| LeaderboardError::aggregation(index, "missing field `score`"))?;
        if !score.is_finite() || score < 0.0 {
            return Err(LeaderboardError::aggregation(
                index,
                format!("score must be a non-negative number, got {}", score),
            ));
        }

        let slot = groups.slot(participant);
        if slot == latest.len() {
            latest.push((timestamp, score));
        } else if timestamp > latest[slot].0 {
            // Strictly later only: equal timestamps keep the first record seen.
            latest[slot] = (timestamp, score);
        }
    }

    Ok(groups
        .into_participants()
        .into_iter()
        .zip(latest)
        .map(|(participant, (_, score))| (participant, score))
        .collect())
}

/// Sort descending by points and assign 1-based ranks.
///
/// The sort is stable, so tied participants keep their first-seen order.
fn rank(mut totals: Vec<(String, f64)>) -> Vec<RankedEntry> {
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    totals
        .into_iter()
        .enumerate()
        .map(|(i, (participant_id, points))| RankedEntry {
            participant_id,
            points,
            rank: i + 1,
        })
        .collect()
}

fn participant_of(index: usize, record: &RawRecord) -> Result<&str, LeaderboardError> {
    match record.participant_id.as_deref() {
        Some(id) if !id.trim().is_empty() => Ok(id),
        Some(_) => Err(LeaderboardError::aggregation(index, "empty `participantId`")),
        None => Err(LeaderboardError::aggregation(
            index,
            "missing field `participantId`",
        )),
    }
}

/// Parse an RFC 3339 timestamp, falling back to a bare `YYYY-MM-DD HH:MM:SS` read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Participant keys in first-seen order with their slot index.
#[derive(Default)]
struct Grouping {
    slots: HashMap<String, usize>,
    order: Vec<String>,
}

impl Grouping {
    fn slot(&mut self, participant: &str) -> usize {
        if let Some(&slot) = self.slots.get(participant) {
            return slot;
        }
        let slot = self.order.len();
        self.slots.insert(participant.to_string(), slot);
        self.order.push(participant.to_string());
        slot
    }

    fn into_participants(self) -> Vec<String> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TEN: ScoringPolicy = ScoringPolicy::TaskCount { points_per_task: 10 };

    fn entry(participant: &str, points: f64, rank: usize) -> RankedEntry {
        RankedEntry {
            participant_id: participant.to_string(),
            points,
            rank,
        }
    }

    fn assert_well_ranked(records: &[RawRecord], entries: &[RankedEntry]) {
        let distinct: HashSet<_> = records
            .iter()
            .filter_map(|r| r.participant_id.as_deref())
            .collect();
        assert_eq!(entries.len(), distinct.len());

        let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
        let expected: Vec<usize> = (1..=entries.len()).collect();
        assert_eq!(ranks, expected);

        for pair in entries.windows(2) {
            assert!(pair[0].points >= pair[1].points);
        }
    }

    #[test]
    fn test_task_count_example() {
        let records = vec![
            RawRecord::task("alice", 1),
            RawRecord::task("alice", 2),
            RawRecord::task("bob", 1),
        ];

        let entries = aggregate(&records, TEN).unwrap();
        assert_eq!(entries, vec![entry("alice", 20.0, 1), entry("bob", 10.0, 2)]);
    }

    #[test]
    fn test_task_count_does_not_dedupe_tasks() {
        let records = vec![
            RawRecord::task("alice", 1),
            RawRecord::task("alice", 1),
            RawRecord::task("alice", 1),
        ];

        let entries = aggregate(&records, TEN).unwrap();
        assert_eq!(entries, vec![entry("alice", 30.0, 1)]);
    }

    #[test]
    fn test_task_count_custom_points() {
        let records = vec![RawRecord::task("alice", 1), RawRecord::task("alice", 2)];
        let policy = ScoringPolicy::TaskCount { points_per_task: 25 };

        let entries = aggregate(&records, policy).unwrap();
        assert_eq!(entries[0].points, 50.0);
    }

    #[test]
    fn test_latest_score_example() {
        let records = vec![
            RawRecord::scored("alice", "2025-01-01T00:00:00Z", 5.0),
            RawRecord::scored("alice", "2025-01-02T00:00:00Z", 8.0),
        ];

        let entries = aggregate(&records, ScoringPolicy::LatestScore).unwrap();
        assert_eq!(entries, vec![entry("alice", 8.0, 1)]);
    }

    #[test]
    fn test_latest_score_ignores_source_order() {
        let records = vec![
            RawRecord::scored("alice", "2025-01-03T00:00:00Z", 4.0),
            RawRecord::scored("alice", "2025-01-01T00:00:00Z", 9.0),
            RawRecord::scored("bob", "2025-01-02T00:00:00+02:00", 6.0),
        ];

        let entries = aggregate(&records, ScoringPolicy::LatestScore).unwrap();
        assert_eq!(entries, vec![entry("bob", 6.0, 1), entry("alice", 4.0, 2)]);
    }

    #[test]
    fn test_latest_score_equal_timestamps_first_wins() {
        let records = vec![
            RawRecord::scored("alice", "2025-01-01T00:00:00Z", 3.0),
            RawRecord::scored("alice", "2025-01-01T00:00:00Z", 7.0),
        ];

        let entries = aggregate(&records, ScoringPolicy::LatestScore).unwrap();
        assert_eq!(entries[0].points, 3.0);
    }

    #[test]
    fn test_latest_score_compares_instants_not_strings() {
        // 10:00+02:00 is 08:00Z, earlier than 09:00Z.
        let records = vec![
            RawRecord::scored("alice", "2025-01-01T09:00:00Z", 1.0),
            RawRecord::scored("alice", "2025-01-01T10:00:00+02:00", 2.0),
        ];

        let entries = aggregate(&records, ScoringPolicy::LatestScore).unwrap();
        assert_eq!(entries[0].points, 1.0);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            RawRecord::task("carol", 1),
            RawRecord::task("alice", 1),
            RawRecord::task("bob", 1),
            RawRecord::task("bob", 2),
        ];

        let entries = aggregate(&records, TEN).unwrap();
        assert_eq!(
            entries,
            vec![
                entry("bob", 20.0, 1),
                entry("carol", 10.0, 2),
                entry("alice", 10.0, 3),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], TEN).unwrap().is_empty());
        assert!(aggregate(&[], ScoringPolicy::LatestScore).unwrap().is_empty());
    }

    #[test]
    fn test_missing_score_fails_whole_aggregation() {
        let mut broken = RawRecord::scored("bob", "2025-01-01T00:00:00Z", 1.0);
        broken.score = None;
        let records = vec![
            RawRecord::scored("alice", "2025-01-01T00:00:00Z", 5.0),
            broken,
        ];

        let err = aggregate(&records, ScoringPolicy::LatestScore).unwrap_err();
        assert_eq!(err, LeaderboardError::aggregation(1, "missing field `score`"));
    }

    #[test]
    fn test_missing_task_id_fails() {
        let mut broken = RawRecord::task("bob", 1);
        broken.task_id = None;

        let err = aggregate(&[RawRecord::task("alice", 1), broken], TEN).unwrap_err();
        assert!(matches!(err, LeaderboardError::Aggregation { index: 1, .. }));
    }

    #[test]
    fn test_policy_shape_mismatch_fails() {
        // A latest-score feed read under task-count scoring has no task ids.
        let records = vec![RawRecord::scored("alice", "2025-01-01T00:00:00Z", 5.0)];
        assert!(aggregate(&records, TEN).is_err());

        let records = vec![RawRecord::task("alice", 1)];
        assert!(aggregate(&records, ScoringPolicy::LatestScore).is_err());
    }

    #[test]
    fn test_missing_or_blank_participant_fails() {
        let mut missing = RawRecord::task("x", 1);
        missing.participant_id = None;
        assert!(aggregate(&[missing], TEN).is_err());

        let blank = RawRecord::task("   ", 1);
        let err = aggregate(&[blank], TEN).unwrap_err();
        assert_eq!(err, LeaderboardError::aggregation(0, "empty `participantId`"));
    }

    #[test]
    fn test_padded_participant_ids_stay_distinct() {
        let records = vec![
            RawRecord::task("alice", 1),
            RawRecord::task("alice ", 2),
            RawRecord::task("alice ", 3),
        ];
        let entries = aggregate(&records, TEN).unwrap();
        assert_well_ranked(&records, &entries);
        assert_eq!(
            entries,
            vec![entry("alice ", 20.0, 1), entry("alice", 10.0, 2)]
        );
    }

    #[test]
    fn test_invalid_timestamp_fails() {
        let records = vec![RawRecord::scored("alice", "yesterday", 5.0)];
        let err = aggregate(&records, ScoringPolicy::LatestScore).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn test_negative_score_fails() {
        let records = vec![RawRecord::scored("alice", "2025-01-01T00:00:00Z", -1.0)];
        assert!(aggregate(&records, ScoringPolicy::LatestScore).is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-01-01T00:00:00.000Z").is_some());
        assert_eq!(
            parse_timestamp("2025-01-01 12:30:00"),
            parse_timestamp("2025-01-01T12:30:00Z")
        );
        assert!(parse_timestamp("01/02/2025").is_none());
    }

    #[test]
    fn test_ranking_invariants_and_idempotence() {
        let participants = ["dora", "eli", "fay", "gus", "hal"];
        let records: Vec<RawRecord> = (0..40u64)
            .map(|i| RawRecord::task(participants[(i * i % 7) as usize % 5], i))
            .collect();

        let first = aggregate(&records, TEN).unwrap();
        assert_well_ranked(&records, &first);

        let second = aggregate(&records, TEN).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixture_feeds() {
        let tasks: Vec<RawRecord> =
            serde_json::from_str(include_str!("../../fixtures/task_records.json")).unwrap();
        let entries = aggregate(&tasks, TEN).unwrap();
        assert_well_ranked(&tasks, &entries);
        assert_eq!(entries[0].participant_id, "jayasanka");
        assert_eq!(entries[0].points, 40.0);

        let scores: Vec<RawRecord> =
            serde_json::from_str(include_str!("../../fixtures/score_records.json")).unwrap();
        let entries = aggregate(&scores, ScoringPolicy::LatestScore).unwrap();
        assert_well_ranked(&scores, &entries);
        assert_eq!(entries[0].participant_id, "mseaton");
        assert_eq!(entries[0].points, 12.0);
    }
}
