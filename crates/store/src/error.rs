use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Connect(#[source] redis::RedisError),

    #[error("store query failed: {0}")]
    Query(#[from] redis::RedisError),

    #[error("invalid store address `{0}`")]
    Address(String),
}
