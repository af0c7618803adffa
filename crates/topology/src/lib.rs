//! # Fleetmap Topology
//!
//! The two resolution engines at the heart of fleetmap:
//!
//! - the **directory resolver** — a four-stage pipelined join over the
//!   key-value store that turns loosely-linked routing facts
//!   (stream → ip, ip → hostname, hostname → type, stream → active host)
//!   into one canonical `host identity → assigned streams` mapping;
//! - the **recency grouper** — collapses an unordered window of heartbeat
//!   entries to the most recent record per logical source, grouped by
//!   reporting host.
//!
//! Both engines are written against the capability traits of
//! `fleetmap-store` and `fleetmap-log-index`; handles are passed in
//! explicitly, never held in globals.

mod error;
mod grouper;
mod hosts;
mod redirects;
mod resolver;

pub use error::{Result, TopologyError};
pub use grouper::{
    active_stream_count, adapter_assignments, assignments_by_host, connected_transcoders,
    group_by_host, hosts_reporting, latest_by_source, AGGREGATE_PLACEHOLDER,
};
pub use hosts::{ingester_hosts, IngesterHost, Station};
pub use redirects::{active_redirects, fresh_redirects, Redirect};
pub use resolver::{Directory, DirectoryResolver};
