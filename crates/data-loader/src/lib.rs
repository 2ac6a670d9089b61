//! # Data Loader Crate
//!
//! Domain records of the event recommendation engine and an in-memory index
//! that can be loaded from `::`-separated exports.
//!
//! ## Main Components
//!
//! - **types**: `UserAction`, `EventSimilarity`, `RecommendedEvent`, `ActivityIndex`
//! - **parser**: Parse `actions.dat` / `similarities.dat` into records
//! - **index**: Build and validate an `ActivityIndex`
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::ActivityIndex;
//! use std::path::Path;
//!
//! let index = ActivityIndex::load_from_files(Path::new("data/events"))?;
//! let (users, actions, similarities) = index.counts();
//! println!("{users} users, {actions} actions, {similarities} similarity rows");
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use types::{
    ActivityIndex,
    EventId,
    EventSimilarity,
    RecommendedEvent,
    UserAction,
    UserId,
};
