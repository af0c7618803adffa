//! # Fleetmap Store
//!
//! Key-value store capabilities consumed by the directory resolver.
//!
//! The resolver never talks to a concrete database; it is written against the
//! [`KeyStore`] trait, which exposes exactly the three capabilities the join
//! needs: prefix enumeration, pipelined positional batch-get, and hash
//! snapshots. [`RedisStore`] is the production implementation,
//! [`MemoryStore`] the in-process one used by tests and examples.

mod error;
mod keys;
mod memory;
mod redis_store;
mod store;

pub use error::{Result, StoreError};
pub use keys::{KeyScheme, DEFAULT_STREAM_PREFIX};
pub use memory::MemoryStore;
pub use redis_store::{RedisSettings, RedisStore};
pub use store::KeyStore;
