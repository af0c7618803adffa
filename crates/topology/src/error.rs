use fleetmap_log_index::IndexError;
use fleetmap_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TopologyError>;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("log index error: {0}")]
    Index(#[from] IndexError),

    #[error("malformed host label `{0}`: expected hostname:ip:type")]
    MalformedLabel(String),
}

impl TopologyError {
    /// Connectivity failures mean "directory temporarily unavailable";
    /// a malformed label means the store data broke its contract. The two
    /// must stay distinguishable for operators.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Index(_))
    }
}
