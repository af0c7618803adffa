use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("search backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed search response: {0}")]
    Response(String),
}
