//! # Stores Crate
//!
//! The two read-only collaborators of the recommendation engine:
//!
//! - **ActionStore**: weighted user-event interactions, by user or by event set
//! - **SimilarityStore**: precomputed event-pair similarities, by event,
//!   by neighbor rank, or "newly relevant" to a set of seed events
//!
//! Both are async traits so a networked backend fits behind them. `MemoryStore`
//! implements both over a shared `ActivityIndex`.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::ActivityIndex;
//! use stores::{MemoryStore, SimilarityStore};
//! use std::sync::Arc;
//!
//! let index = Arc::new(ActivityIndex::load_from_files("data/events".as_ref())?);
//! let store = MemoryStore::new(index);
//! let neighbors = store.top_neighbors(42, 5).await?;
//! ```

pub mod error;
pub mod traits;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{ActionStore, SimilarityStore};
