use crate::error::Result;
use async_trait::async_trait;

/// Capabilities the directory resolver needs from a key-value store.
///
/// The contract is deliberately narrow: the resolver performs a fixed join
/// pattern, not arbitrary queries. `batch_get` is the load-bearing piece —
/// the response MUST contain one slot per requested key, in request order,
/// so that callers can zip responses back to their keys positionally.
#[async_trait]
pub trait KeyStore: Send {
    /// Enumerate every key matching a glob-style pattern (e.g. `prefix*`).
    async fn scan(&mut self, pattern: &str) -> Result<Vec<String>>;

    /// Fetch a list of keys in a single pipelined round-trip.
    ///
    /// Responses are positionally aligned with `keys`. A missing key yields
    /// `None` in its slot, never an error; a value that cannot be decoded is
    /// logged and also surfaced as `None`.
    async fn batch_get(&mut self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// All field/value pairs of a hash key.
    async fn hash_entries(&mut self, key: &str) -> Result<Vec<(String, String)>>;
}
