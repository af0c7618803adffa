use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use fleetmap_store::KeyStore;
use serde::{Deserialize, Serialize};

/// One redirect snapshot entry, JSON-encoded by the redirect hosts into the
/// fields of a store hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redirect {
    pub streams: i64,
    pub max: i64,
    pub host: String,
    pub timestamp: DateTime<Utc>,
}

impl Redirect {
    /// Seconds since the entry was written, for display.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_seconds()
    }
}

/// Decode hash entries into redirects, keeping only entries fresher than
/// `max_age`. Undecodable entries are logged and skipped.
pub fn fresh_redirects(
    entries: Vec<(String, String)>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Vec<Redirect> {
    let mut redirects = Vec::new();
    for (field, value) in entries {
        let redirect: Redirect = match serde_json::from_str(&value) {
            Ok(redirect) => redirect,
            Err(err) => {
                log::warn!("undecodable redirect entry `{field}`, skipping: {err}");
                continue;
            }
        };
        if now - redirect.timestamp < max_age {
            redirects.push(redirect);
        }
    }
    redirects
}

/// Fetch the redirect hash and keep the fresh entries.
pub async fn active_redirects<S>(
    store: &mut S,
    hash_key: &str,
    max_age: Duration,
) -> Result<Vec<Redirect>>
where
    S: KeyStore + ?Sized,
{
    let entries = store.hash_entries(hash_key).await?;
    Ok(fresh_redirects(entries, Utc::now(), max_age))
}
