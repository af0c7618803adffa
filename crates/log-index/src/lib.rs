//! # Fleetmap Log Index
//!
//! Client for the time-ordered log/search index that external hosts write
//! heartbeat entries into. The recency grouper consumes this crate through
//! the [`LogIndex`] trait; [`HttpLogIndex`] is the production implementation
//! against an Elasticsearch-style search API.

mod error;
mod http;
mod index;
mod record;

pub use error::{IndexError, Result};
pub use http::HttpLogIndex;
pub use index::LogIndex;
pub use record::{HeartbeatFields, HeartbeatRecord};
