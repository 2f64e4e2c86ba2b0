//! HTTP record source.

use super::{parse_records, RecordSource};
use crate::error::LeaderboardError;
use crate::models::RawRecord;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Fetches the submission list with one GET against a fixed endpoint.
pub struct HttpSource {
    endpoint: String,
    timeout_seconds: Option<u64>,
    http_client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `endpoint`.
    ///
    /// Without a timeout a hung request waits indefinitely.
    pub fn new(
        endpoint: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, LeaderboardError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("hunt_board/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| LeaderboardError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            timeout_seconds,
            http_client,
        })
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, LeaderboardError> {
        debug!("GET {}", self.endpoint);

        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LeaderboardError::Network(format!(
                        "request timed out after {}s",
                        self.timeout_seconds.unwrap_or_default()
                    ))
                } else if e.is_connect() {
                    LeaderboardError::Network(format!("cannot connect to {}", self.endpoint))
                } else {
                    LeaderboardError::Network(format!("failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeaderboardError::Network(format!(
                "failed to fetch leaderboard data: HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LeaderboardError::Network(format!("failed to read response body: {}", e)))?;

        let records = parse_records(&body)?;
        info!("Fetched {} records", records.len());
        Ok(records)
    }

    fn location(&self) -> &str {
        &self.endpoint
    }
}
