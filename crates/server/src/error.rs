//! Error taxonomy of the recommendation engine.
//!
//! An empty result is not an error: users or events without data get an
//! empty response.

use stores::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The request was rejected before touching any store
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A store read failed; no partial results are returned
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
