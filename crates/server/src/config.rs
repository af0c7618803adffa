use anyhow::{bail, Context, Result};
use fleetmap_store::{KeyScheme, RedisSettings};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Server configuration, loaded from a JSON file.
///
/// Every field has a default so deployments only spell out what differs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `host:port` of the key-value store.
    pub redis_addr: String,
    pub redis_password: String,
    /// Store key prefix under which streams are registered.
    pub stream_prefix: String,
    /// Redirect group whose snapshot hash is served at /redirects.
    pub redirect_group: String,
    /// Internal domain suffix trimmed from display entries (empty = keep).
    pub domain_suffix: String,
    /// Connect/read/write timeout for store connections, seconds.
    pub store_timeout_secs: u64,

    /// Base URL of the heartbeat search index.
    pub index_url: String,
    /// Index (or index pattern) holding heartbeat entries.
    pub index_name: String,
    pub index_max_results: usize,

    /// Component name adapters report under.
    pub adapter_component: String,
    /// Component name transcoders report under.
    pub transcoder_component: String,
    /// Filter counting active source streams at transcode.
    pub active_stream_filter: String,
    /// Trailing search window for adapter heartbeats, seconds.
    pub adapter_window_secs: i64,
    /// Trailing search window for transcoder heartbeats, seconds.
    pub transcoder_window_secs: i64,
    /// Redirect snapshot entries older than this are stale, seconds.
    pub redirect_max_age_secs: i64,

    /// Slot capacity of one ingester / one adapter, for the slot counters.
    pub max_ingester_slots: usize,
    pub max_adapter_slots: usize,

    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            redis_addr: "127.0.0.1:6379".to_string(),
            redis_password: String::new(),
            stream_prefix: fleetmap_store::DEFAULT_STREAM_PREFIX.to_string(),
            redirect_group: "default".to_string(),
            domain_suffix: String::new(),
            store_timeout_secs: 4,
            index_url: "http://127.0.0.1:9200".to_string(),
            index_name: "heartbeats-*".to_string(),
            index_max_results: 2000,
            adapter_component: "cdnadapter".to_string(),
            transcoder_component: "transcoder".to_string(),
            active_stream_filter: "fields.name:sourcestream".to_string(),
            adapter_window_secs: 600,
            transcoder_window_secs: 240,
            redirect_max_age_secs: 120,
            max_ingester_slots: 8,
            max_adapter_slots: 10,
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        let config: ServerConfig = serde_json::from_str(&data)
            .with_context(|| format!("could not parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.redis_addr.is_empty() {
            bail!("redis_addr must not be empty");
        }
        if self.index_url.is_empty() {
            bail!("index_url must not be empty");
        }
        if self.listen_addr.is_empty() {
            bail!("listen_addr must not be empty");
        }
        if self.adapter_window_secs <= 0 || self.transcoder_window_secs <= 0 {
            bail!("search windows must be positive");
        }
        if self.redirect_max_age_secs <= 0 {
            bail!("redirect_max_age_secs must be positive");
        }
        Ok(())
    }

    pub fn redis_settings(&self) -> RedisSettings {
        RedisSettings::new(self.redis_addr.clone())
            .password(self.redis_password.clone())
            .timeout(Duration::from_secs(self.store_timeout_secs))
    }

    pub fn key_scheme(&self) -> KeyScheme {
        KeyScheme::new(self.stream_prefix.clone())
    }

    /// Suffix to trim from display entries, if configured.
    pub fn trim_suffix(&self) -> Option<&str> {
        if self.domain_suffix.is_empty() {
            None
        } else {
            Some(&self.domain_suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn load_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "redis_addr": "10.1.2.3:6390",
                "redis_password": "hunter2",
                "domain_suffix": ".media.corp",
                "max_ingester_slots": 12
            }}"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.redis_addr, "10.1.2.3:6390");
        assert_eq!(config.max_ingester_slots, 12);
        assert_eq!(config.trim_suffix(), Some(".media.corp"));
        // Untouched fields keep their defaults.
        assert_eq!(config.adapter_component, "cdnadapter");
        assert_eq!(config.stream_prefix, "nameservice:stream:");
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "redis_adr": "typo:6379" }}"#).unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
    }

    #[test]
    fn rejects_bad_windows() {
        let config = ServerConfig {
            adapter_window_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
