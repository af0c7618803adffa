use crate::error::{IndexError, Result};
use crate::index::LogIndex;
use crate::record::HeartbeatRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_MAX_RESULTS: usize = 2000;

/// [`LogIndex`] over an Elasticsearch-style HTTP search API.
pub struct HttpLogIndex {
    base_url: String,
    index: String,
    max_results: usize,
    client: reqwest::Client,
}

impl HttpLogIndex {
    pub fn new(base_url: impl Into<String>, index: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            index: index.into(),
            max_results: DEFAULT_MAX_RESULTS,
            client,
        })
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    fn query_body(start: DateTime<Utc>, end: DateTime<Utc>, filter: &str) -> Value {
        let mut clauses = vec![json!({
            "range": {
                "@timestamp": {
                    "gte": start.to_rfc3339(),
                    "lte": end.to_rfc3339(),
                }
            }
        })];
        if !filter.is_empty() {
            clauses.push(json!({ "query_string": { "query": filter } }));
        }
        json!({ "bool": { "filter": clauses } })
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}/{endpoint}", self.base_url, self.index);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl LogIndex for HttpLogIndex {
    async fn search(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        filter: &str,
    ) -> Result<Vec<HeartbeatRecord>> {
        let body = json!({
            "size": self.max_results,
            "query": Self::query_body(start, end, filter),
        });
        let response = self.post("_search", &body).await?;
        parse_hits(&response)
    }

    async fn count(&self, start: DateTime<Utc>, end: DateTime<Utc>, filter: &str) -> Result<u64> {
        let body = json!({ "query": Self::query_body(start, end, filter) });
        let response = self.post("_count", &body).await?;
        response
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| IndexError::Response("missing `count` field".into()))
    }
}

/// Decode the hit list of a search response.
///
/// A hit whose `_source` does not decode is logged and skipped; only a
/// missing/malformed envelope fails the call.
fn parse_hits(response: &Value) -> Result<Vec<HeartbeatRecord>> {
    let hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| IndexError::Response("missing `hits.hits` array".into()))?;

    let mut records = Vec::with_capacity(hits.len());
    for hit in hits {
        let Some(source) = hit.get("_source") else {
            log::warn!("search hit without `_source`, skipping");
            continue;
        };
        match serde_json::from_value::<HeartbeatRecord>(source.clone()) {
            Ok(record) => records.push(record),
            Err(err) => log::warn!("undecodable heartbeat entry, skipping: {err}"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hits_and_skips_bad_entries() {
        let response = json!({
            "hits": {
                "total": { "value": 3 },
                "hits": [
                    { "_source": { "@timestamp": "2026-08-06T12:00:00Z",
                                   "fields": { "host": "h1", "sourceStreamID": "a" } } },
                    { "_source": { "@timestamp": "not-a-timestamp" } },
                    { "_source": { "@timestamp": "2026-08-06T12:01:00Z",
                                   "fields": { "host": "h2", "sourceStreamID": "b" } } }
                ]
            }
        });

        let records = parse_hits(&response).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields.source_stream_id, "a");
        assert_eq!(records[1].fields.host, "h2");
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        let err = parse_hits(&json!({ "took": 3 })).unwrap_err();
        assert!(matches!(err, IndexError::Response(_)));
    }

    #[test]
    fn query_body_omits_empty_filter() {
        let start = "2026-08-06T11:56:00Z".parse().unwrap();
        let end = "2026-08-06T12:00:00Z".parse().unwrap();

        let body = HttpLogIndex::query_body(start, end, "");
        let clauses = body.pointer("/bool/filter").unwrap().as_array().unwrap();
        assert_eq!(clauses.len(), 1);

        let body = HttpLogIndex::query_body(start, end, "fields.name:cdnadapter");
        let clauses = body.pointer("/bool/filter").unwrap().as_array().unwrap();
        assert_eq!(clauses.len(), 2);
    }
}
