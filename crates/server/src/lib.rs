//! Server crate for the event recommendation engine.
//!
//! Holds the `RecommendationEngine`, which wires the store collaborators to
//! the scoring pipeline and exposes the three public operations, plus the
//! request/response shapes and error taxonomy around it.

pub mod engine;
pub mod error;
pub mod requests;
pub mod response;

pub use engine::RecommendationEngine;
pub use error::{EngineError, Result};
pub use requests::{InteractionsCountRequest, SimilarEventsRequest, UserPredictionsRequest};
