use crate::error::Result;
use crate::store::KeyStore;
use async_trait::async_trait;
use std::collections::HashMap;

/// In-process [`KeyStore`] for tests and examples.
///
/// Entries are kept in insertion order and `scan` enumerates them that way,
/// so tests can vary enumeration order and prove the resolver's output does
/// not depend on it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
    hashes: HashMap<String, Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a plain key.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Insert or overwrite a hash field.
    pub fn put_hash(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        let fields = self.hashes.entry(key.into()).or_default();
        let field = field.into();
        let value = value.into();
        if let Some(entry) = fields.iter_mut().find(|(f, _)| *f == field) {
            entry.1 = value;
        } else {
            fields.push((field, value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn scan(&mut self, pattern: &str) -> Result<Vec<String>> {
        // Only the prefix form the resolver uses; a bare pattern is an exact
        // match.
        let keys = match pattern.strip_suffix('*') {
            Some(prefix) => self
                .entries
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, _)| k.clone())
                .collect(),
            None => self
                .entries
                .iter()
                .filter(|(k, _)| k == pattern)
                .map(|(k, _)| k.clone())
                .collect(),
        };
        Ok(keys)
    }

    async fn batch_get(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        Ok(keys
            .iter()
            .map(|key| {
                self.entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            })
            .collect())
    }

    async fn hash_entries(&mut self, key: &str) -> Result<Vec<(String, String)>> {
        Ok(self.hashes.get(key).cloned().unwrap_or_default())
    }
}
