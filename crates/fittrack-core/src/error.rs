use fittrack_api::ApiError;
use fittrack_cache::CacheError;
use thiserror::Error;

/// All the ways things can go wrong in fittrack
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Snapshot operation failed: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}
