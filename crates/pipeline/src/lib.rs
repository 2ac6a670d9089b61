//! Scoring pipeline for event candidates.
//!
//! This crate provides:
//! - `NeighborResolver` for batched top-k neighbor lookups
//! - `ScorePredictor` for neighbor-weighted score prediction
//! - ranking helpers for exclusion and top-K selection
//!
//! ## Architecture
//! Personalized requests flow through the predictor:
//! 1. Seed similarity rows name the candidates
//! 2. `NeighborResolver` fetches each candidate's neighbors in one batch
//! 3. The user's weights on those neighbors are averaged by similarity
//!
//! Similar-event requests only need `exclude_seen` and `top_by_score`.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{NeighborResolver, ScorePredictor};
//!
//! let resolver = NeighborResolver::new(similarity_store.clone());
//! let predictor = ScorePredictor::new(resolver, action_store.clone());
//! let scores = predictor.predict_scores(user_id, &rows, &user_events).await?;
//! ```

pub mod neighbors;
pub mod predictor;
pub mod ranking;

// Re-export main types
pub use neighbors::NeighborResolver;
pub use predictor::{NEIGHBOR_COUNT, ScorePredictor, predicted_score, select_candidate};
pub use ranking::{exclude_seen, top_by_score};
