use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One heartbeat entry as written to the log index by an external host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub fields: HeartbeatFields,
}

/// The structured payload of a heartbeat.
///
/// `host` is the reporting host, `name` the component that emitted the
/// entry, `source_stream_id` the logical source the entry is about. Anything
/// else the emitter attached is kept in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatFields {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "sourceStreamID")]
    pub source_stream_id: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HeartbeatRecord {
    pub fn new(
        source_stream_id: impl Into<String>,
        host: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            fields: HeartbeatFields {
                host: host.into(),
                source_stream_id: source_stream_id.into(),
                ..Default::default()
            },
        }
    }
}
