//! Inbound request shapes, independent of transport encoding.
//!
//! `max_results` stays a signed integer as it arrives on the wire; the
//! engine validates it before use.

use data_loader::{EventId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPredictionsRequest {
    pub user_id: UserId,
    pub max_results: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarEventsRequest {
    pub user_id: UserId,
    pub event_id: EventId,
    pub max_results: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionsCountRequest {
    /// May contain duplicates; treated as a set
    pub event_ids: Vec<EventId>,
}

/// Converts a wire `max_results` into a usable limit.
pub(crate) fn result_limit(max_results: i32) -> Result<usize> {
    usize::try_from(max_results).map_err(|_| {
        EngineError::InvalidRequest(format!(
            "max_results must not be negative, got {}",
            max_results
        ))
    })
}
