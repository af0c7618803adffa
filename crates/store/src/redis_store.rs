use crate::error::{Result, StoreError};
use crate::store::KeyStore;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;

const SCAN_BATCH: usize = 512;

/// Connection settings for the Redis-backed store.
///
/// Timeouts are fixed once here and apply to every command on the resulting
/// connection; there is no retry policy inside the store layer.
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub addr: String,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl RedisSettings {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            password: None,
            timeout: Duration::from_secs(4),
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        if !password.is_empty() {
            self.password = Some(password);
        }
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}", password, self.addr),
            None => format!("redis://{}", self.addr),
        }
    }

    /// Open a fresh connection. Callers open one per resolution pass and let
    /// it drop on every exit path.
    pub async fn connect(&self) -> Result<RedisStore> {
        let client = redis::Client::open(self.url())
            .map_err(|_| StoreError::Address(self.addr.clone()))?;
        let conn = client
            .get_multiplexed_async_connection_with_timeouts(self.timeout, self.timeout)
            .await
            .map_err(StoreError::Connect)?;
        Ok(RedisStore { conn })
    }
}

/// A live store connection.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn scan(&mut self, pattern: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut self.conn)
                .await?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }

    async fn batch_get(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("GET").arg(key);
        }
        let replies: Vec<redis::Value> = pipe.query_async(&mut self.conn).await?;
        Ok(replies
            .into_iter()
            .zip(keys)
            .map(|(value, key)| decode_value(value, key))
            .collect())
    }

    async fn hash_entries(&mut self, key: &str) -> Result<Vec<(String, String)>> {
        let entries: Vec<(String, String)> = redis::cmd("HGETALL")
            .arg(key)
            .query_async(&mut self.conn)
            .await?;
        Ok(entries)
    }
}

fn decode_value(value: redis::Value, key: &str) -> Option<String> {
    match value {
        redis::Value::Nil => None,
        redis::Value::SimpleString(s) => Some(s),
        redis::Value::BulkString(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Some(s),
            Err(_) => {
                log::warn!("value for `{key}` is not valid UTF-8, skipping");
                None
            }
        },
        other => {
            log::warn!("unexpected reply type for `{key}`: {other:?}, skipping");
            None
        }
    }
}
