use crate::error::Result;
use chrono::{Duration, Utc};
use fleetmap_log_index::{HeartbeatRecord, LogIndex};
use std::collections::{BTreeMap, HashSet};

/// Placeholder list for record types whose individual identifiers are not
/// meaningful.
pub const AGGREGATE_PLACEHOLDER: &str = "various";

/// Keep only the most recent record per logical source.
///
/// The sort is stable and descending by timestamp, so records sharing the
/// maximum timestamp keep their input order and the first-seen one survives
/// the dedupe — deterministic for a fixed input ordering.
pub fn latest_by_source(mut records: Vec<HeartbeatRecord>) -> Vec<HeartbeatRecord> {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.fields.source_stream_id.clone()));
    records
}

/// Partition records by reporting host. No ordering guarantee on the lists;
/// every record lands under exactly one host.
pub fn group_by_host(records: &[HeartbeatRecord]) -> BTreeMap<String, Vec<String>> {
    let mut hosts: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        hosts
            .entry(record.fields.host.clone())
            .or_default()
            .push(record.fields.source_stream_id.clone());
    }
    hosts
}

/// Most recent record per logical source, grouped by reporting host.
pub fn assignments_by_host(records: Vec<HeartbeatRecord>) -> BTreeMap<String, Vec<String>> {
    group_by_host(&latest_by_source(records))
}

/// Degraded/aggregate variant of the grouping: records are filtered by
/// component name and each reporting host maps to the constant
/// `["various"]` instead of collected identifiers.
pub fn hosts_reporting(
    records: &[HeartbeatRecord],
    component: &str,
) -> BTreeMap<String, Vec<String>> {
    let mut hosts = BTreeMap::new();
    for record in records.iter().filter(|r| r.fields.name == component) {
        hosts
            .entry(record.fields.host.clone())
            .or_insert_with(|| vec![AGGREGATE_PLACEHOLDER.to_string()]);
    }
    hosts
}

/// Latest assignment of every logical source reported by `component` within
/// the trailing window, grouped by reporting host.
pub async fn adapter_assignments(
    index: &dyn LogIndex,
    component: &str,
    window: Duration,
) -> Result<BTreeMap<String, Vec<String>>> {
    let end = Utc::now();
    let records = index
        .search(end - window, end, &component_filter(component))
        .await?;
    Ok(assignments_by_host(records))
}

/// Hosts that reported as `component` within the trailing window.
pub async fn connected_transcoders(
    index: &dyn LogIndex,
    component: &str,
    window: Duration,
) -> Result<BTreeMap<String, Vec<String>>> {
    let end = Utc::now();
    let records = index
        .search(end - window, end, &component_filter(component))
        .await?;
    Ok(hosts_reporting(&records, component))
}

/// Index-side count of heartbeat entries matching `filter` in the window.
pub async fn active_stream_count(
    index: &dyn LogIndex,
    filter: &str,
    window: Duration,
) -> Result<u64> {
    let end = Utc::now();
    Ok(index.count(end - window, end, filter).await?)
}

fn component_filter(component: &str) -> String {
    format!("fields.name:{component}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use fleetmap_log_index::IndexError;
    use pretty_assertions::assert_eq;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn record(source: &str, host: &str, seconds: i64) -> HeartbeatRecord {
        HeartbeatRecord::new(source, host, at(seconds))
    }

    #[test]
    fn later_timestamp_wins() {
        let survivors = latest_by_source(vec![
            record("A", "H1", 10),
            record("A", "H2", 20),
            record("B", "H2", 15),
        ]);

        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].fields.host, "H2");
        assert_eq!(survivors[0].fields.source_stream_id, "A");
    }

    #[test]
    fn equal_timestamps_keep_first_seen() {
        let survivors = latest_by_source(vec![
            record("A", "first", 10),
            record("A", "second", 10),
        ]);

        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].fields.host, "first");
    }

    #[test]
    fn grouping_is_a_partition() {
        let records = vec![
            record("A", "H1", 5),
            record("B", "H1", 6),
            record("C", "H2", 7),
            record("D", "H3", 8),
        ];
        let survivors = latest_by_source(records);
        let grouped = group_by_host(&survivors);

        let mut all: Vec<String> = grouped.values().flatten().cloned().collect();
        all.sort();
        assert_eq!(all, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn stale_duplicates_collapse_before_grouping() {
        // [(src=A,host=H1,t=10), (src=A,host=H1,t=20), (src=B,host=H2,t=15)]
        // => {"H1": ["A"], "H2": ["B"]}
        let grouped = assignments_by_host(vec![
            record("A", "H1", 10),
            record("A", "H1", 20),
            record("B", "H2", 15),
        ]);

        let mut expected = BTreeMap::new();
        expected.insert("H1".to_string(), vec!["A".to_string()]);
        expected.insert("H2".to_string(), vec!["B".to_string()]);
        assert_eq!(grouped, expected);
    }

    #[test]
    fn aggregate_variant_filters_and_collapses() {
        let mut transcoder = record("A", "T1", 10);
        transcoder.fields.name = "transcoder".into();
        let mut transcoder_again = record("B", "T1", 11);
        transcoder_again.fields.name = "transcoder".into();
        let mut other = record("C", "X1", 12);
        other.fields.name = "cdnadapter".into();

        let grouped = hosts_reporting(&[transcoder, transcoder_again, other], "transcoder");

        let mut expected = BTreeMap::new();
        expected.insert("T1".to_string(), vec![AGGREGATE_PLACEHOLDER.to_string()]);
        assert_eq!(grouped, expected);
    }

    struct FixedIndex {
        records: Vec<HeartbeatRecord>,
    }

    #[async_trait]
    impl LogIndex for FixedIndex {
        async fn search(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            filter: &str,
        ) -> std::result::Result<Vec<HeartbeatRecord>, IndexError> {
            // Mimic the backend's `fields.name:<component>` filtering.
            let component = filter.strip_prefix("fields.name:").unwrap_or("");
            Ok(self
                .records
                .iter()
                .filter(|r| r.fields.name == component)
                .cloned()
                .collect())
        }

        async fn count(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _filter: &str,
        ) -> std::result::Result<u64, IndexError> {
            Ok(self.records.len() as u64)
        }
    }

    #[tokio::test]
    async fn adapter_assignments_use_latest_records() {
        let mut stale = record("A", "old-host", 10);
        stale.fields.name = "cdnadapter".into();
        let mut current = record("A", "new-host", 20);
        current.fields.name = "cdnadapter".into();
        let index = FixedIndex {
            records: vec![stale, current],
        };

        let grouped = adapter_assignments(&index, "cdnadapter", Duration::minutes(10))
            .await
            .unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("new-host".to_string(), vec!["A".to_string()]);
        assert_eq!(grouped, expected);
    }

    #[tokio::test]
    async fn active_stream_count_passes_through() {
        let index = FixedIndex {
            records: vec![record("A", "T1", 10), record("B", "T2", 11)],
        };
        let count = active_stream_count(&index, "fields.name:sourcestream", Duration::minutes(4))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn connected_transcoders_collapse_to_placeholder() {
        let mut a = record("A", "T1", 10);
        a.fields.name = "transcoder".into();
        let mut b = record("B", "T2", 11);
        b.fields.name = "transcoder".into();
        let index = FixedIndex {
            records: vec![a, b],
        };

        let grouped = connected_transcoders(&index, "transcoder", Duration::minutes(4))
            .await
            .unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["T1"], vec![AGGREGATE_PLACEHOLDER.to_string()]);
        assert_eq!(grouped["T2"], vec![AGGREGATE_PLACEHOLDER.to_string()]);
    }
}
