use crate::error::Result;
use fleetmap_store::{KeyScheme, KeyStore};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sentinel for a hostname or type that is unresolved or too short to be
/// meaningful.
const UNKNOWN: &str = "unknown";

/// The resolved directory: one entry per host identity label
/// (`hostname:ip:type`), each holding the stream entries assigned to that
/// host. `skipped` counts the streams dropped along the way (expired between
/// stages, missing ingest address, undecodable value).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Directory {
    pub assignments: BTreeMap<String, Vec<String>>,
    pub skipped: u64,
}

/// Resolves the chained stream → ip → hostname → type join.
///
/// The store has no join operator, so the resolver simulates one with four
/// strictly ordered stages, each a single pipelined round-trip. Stage *n+1*'s
/// request set is derived from stage *n*'s response, and every batch response
/// is consumed positionally against its request list.
pub struct DirectoryResolver {
    scheme: KeyScheme,
}

impl DirectoryResolver {
    pub fn new(scheme: KeyScheme) -> Self {
        Self { scheme }
    }

    /// Resolve the full directory from a live store connection.
    ///
    /// Store-level failures abort the call with no partial result; per-entry
    /// anomalies are dropped and counted in [`Directory::skipped`].
    pub async fn resolve<S>(&self, store: &mut S) -> Result<Directory>
    where
        S: KeyStore + ?Sized,
    {
        // Stage 1: enumerate the stream namespace.
        let stream_keys = store.scan(&self.scheme.stream_pattern()).await?;
        if stream_keys.is_empty() {
            return Ok(Directory::default());
        }

        // Stage 2: stream -> ingest IP in one pipelined pass. A short batch
        // response drops the unanswered tail rather than failing the call.
        let values = store.batch_get(&stream_keys).await?;
        let mut skipped = stream_keys.len().saturating_sub(values.len()) as u64;
        let mut by_ip: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in stream_keys.iter().zip(values) {
            let Some(stream_id) = self.scheme.stream_id(key) else {
                log::warn!("scanned key `{key}` is outside the stream namespace, dropping");
                skipped += 1;
                continue;
            };
            match value {
                Some(ip) if !ip.is_empty() => {
                    by_ip.entry(ip).or_default().push(stream_id.to_string());
                }
                _ => {
                    log::warn!("stream `{stream_id}` has no ingest address, dropping");
                    skipped += 1;
                }
            }
        }

        // Lexicographic IP order (BTreeMap) and sorted stream lists fix the
        // request order of stages 3 and 4, making the whole pipeline
        // reproducible no matter how the store enumerated keys.
        for streams in by_ip.values_mut() {
            streams.sort();
        }
        let ips: Vec<String> = by_ip.keys().cloned().collect();

        // Stage 3: two logically distinct lookups merged into one pipeline —
        // `hostlookup:{ip}` for every ordered IP, then
        // `activehost:{stream}` for every stream in (ip, stream) order. The
        // response splits positionally at ips.len().
        let mut wants: Vec<String> = ips.iter().map(|ip| self.scheme.host_lookup(ip)).collect();
        for ip in &ips {
            for stream_id in &by_ip[ip] {
                wants.push(self.scheme.active_host(stream_id));
            }
        }
        let replies = store.batch_get(&wants).await?;
        let hostnames: Vec<String> = (0..ips.len())
            .map(|i| replies.get(i).cloned().flatten().unwrap_or_default())
            .collect();
        let mut active_hosts = replies.into_iter().skip(ips.len());

        // Stage 4: hostname -> ingester type, following the same ordered-IP
        // sequence (raw hostnames, even unresolved ones, keep the positions
        // aligned).
        let type_keys: Vec<String> = hostnames
            .iter()
            .map(|name| self.scheme.host_type(name))
            .collect();
        let types = store.batch_get(&type_keys).await?;

        let mut assignments = BTreeMap::new();
        for (i, ip) in ips.iter().enumerate() {
            let hostname = sanitize(&hostnames[i]);
            let host_type = sanitize(types.get(i).and_then(|t| t.as_deref()).unwrap_or(""));
            let label = format!("{hostname}:{ip}:{host_type}");

            let streams = by_ip[ip]
                .iter()
                .map(|stream_id| match active_hosts.next().flatten() {
                    Some(active) if active.len() > 1 => format!("{active}:{stream_id}"),
                    _ => stream_id.clone(),
                })
                .collect();
            assignments.insert(label, streams);
        }

        if skipped > 0 {
            log::warn!("directory resolution dropped {skipped} stream entries");
        }
        Ok(Directory {
            assignments,
            skipped,
        })
    }

    /// Number of streams currently registered under the stream prefix.
    pub async fn stream_count<S>(&self, store: &mut S) -> Result<usize>
    where
        S: KeyStore + ?Sized,
    {
        Ok(store.scan(&self.scheme.stream_pattern()).await?.len())
    }
}

fn sanitize(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() < 2 {
        UNKNOWN
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmap_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn scheme() -> KeyScheme {
        KeyScheme::default()
    }

    #[test]
    fn sanitize_substitutes_unknown() {
        assert_eq!(sanitize("ingest-a"), "ingest-a");
        assert_eq!(sanitize(""), UNKNOWN);
        assert_eq!(sanitize("x"), UNKNOWN);
        assert_eq!(sanitize("  "), UNKNOWN);
        assert_eq!(sanitize(" ab "), "ab");
    }

    #[tokio::test]
    async fn empty_store_resolves_to_empty_directory() {
        let mut store = MemoryStore::new();
        let directory = DirectoryResolver::new(scheme())
            .resolve(&mut store)
            .await
            .unwrap();
        assert!(directory.assignments.is_empty());
        assert_eq!(directory.skipped, 0);
    }

    #[tokio::test]
    async fn stream_without_address_is_dropped_and_counted() {
        let mut store = MemoryStore::new();
        store.put("nameservice:stream:good", "10.0.0.1");
        store.put("nameservice:stream:empty", "");
        store.put("hostlookup:10.0.0.1", "ingest-a");
        store.put("hosttype:ingest-a", "720p");

        let directory = DirectoryResolver::new(scheme())
            .resolve(&mut store)
            .await
            .unwrap();

        assert_eq!(directory.skipped, 1);
        assert_eq!(
            directory.assignments["ingest-a:10.0.0.1:720p"],
            vec!["good".to_string()]
        );
    }

    #[tokio::test]
    async fn active_host_prefixes_streams_but_not_labels() {
        let mut store = MemoryStore::new();
        store.put("nameservice:stream:s1", "10.0.0.1");
        store.put("nameservice:stream:s2", "10.0.0.1");
        store.put("hostlookup:10.0.0.1", "ingest-a");
        store.put("hosttype:ingest-a", "720p");
        store.put("nameservice:activehost:s1", "ingest-b");
        // Too short to be a usable name; entry stays bare.
        store.put("nameservice:activehost:s2", "x");

        let directory = DirectoryResolver::new(scheme())
            .resolve(&mut store)
            .await
            .unwrap();

        assert_eq!(
            directory.assignments["ingest-a:10.0.0.1:720p"],
            vec!["ingest-b:s1".to_string(), "s2".to_string()]
        );
    }

    #[tokio::test]
    async fn stream_count_counts_keys_under_prefix() {
        let mut store = MemoryStore::new();
        store.put("nameservice:stream:a", "10.0.0.1");
        store.put("nameservice:stream:b", "10.0.0.2");
        store.put("hostlookup:10.0.0.1", "ingest-a");

        let count = DirectoryResolver::new(scheme())
            .stream_count(&mut store)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
