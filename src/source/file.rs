//! Local file record source.

use super::{parse_records, RecordSource};
use crate::error::LeaderboardError;
use crate::models::RawRecord;
use async_trait::async_trait;
use tracing::info;

/// Reads the submission list from a JSON file, re-read on every fetch.
pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for FileSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, LeaderboardError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| {
                LeaderboardError::Network(format!("cannot read feed file {}: {}", self.path, e))
            })?;

        let records = parse_records(&body)?;
        info!("Read {} records from {}", records.len(), self.path);
        Ok(records)
    }

    fn location(&self) -> &str {
        &self.path
    }
}
