use crate::error::Result;
use crate::record::HeartbeatRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read capabilities of the heartbeat log index.
///
/// `filter` is a free-text filter expression in the backend's query syntax
/// (e.g. `fields.name:cdnadapter`); an empty filter matches everything in
/// the window. Results carry no ordering guarantee — recency handling is the
/// caller's job.
#[async_trait]
pub trait LogIndex: Send + Sync {
    async fn search(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        filter: &str,
    ) -> Result<Vec<HeartbeatRecord>>;

    async fn count(&self, start: DateTime<Utc>, end: DateTime<Utc>, filter: &str) -> Result<u64>;
}
