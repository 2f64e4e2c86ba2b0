//! Record sources.
//!
//! A source produces the raw submission list for one refresh cycle. The
//! production source is an HTTP endpoint; a local file with the same JSON
//! body can stand in for it.

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::error::LeaderboardError;
use crate::models::RawRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can fetch the full submission list.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record, in the order the source returns them.
    async fn fetch(&self) -> Result<Vec<RawRecord>, LeaderboardError>;

    /// Where the records come from, for logs and output.
    fn location(&self) -> &str;
}

/// Location prefixes accepted for a configured endpoint.
pub const SUPPORTED_SCHEMES: [&str; 3] = ["http://", "https://", "file://"];

/// Whether `location` names a source `open` knows how to read.
pub fn is_supported_location(location: &str) -> bool {
    SUPPORTED_SCHEMES
        .iter()
        .any(|scheme| location.starts_with(scheme))
}

/// Open a source for a configured location.
///
/// `file://` URLs and plain paths read from disk; `http(s)://` URLs go over the network.
pub fn open(
    location: &str,
    timeout_seconds: Option<u64>,
) -> Result<Arc<dyn RecordSource>, LeaderboardError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location, timeout_seconds)?))
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(Arc::new(FileSource::new(path)))
    }
}

/// Parse a response body as a JSON array of submission records.
pub fn parse_records(body: &str) -> Result<Vec<RawRecord>, LeaderboardError> {
    serde_json::from_str::<Vec<RawRecord>>(body).map_err(|e| {
        LeaderboardError::Parse(format!(
            "expected a JSON array of submission records: {}",
            e
        ))
    })
}
