//! Errors surfaced by store implementations.

use thiserror::Error;

/// A read against a store failed.
///
/// The engine never retries; these propagate to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing service could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
