//! Read contracts the recommendation engine depends on.
//!
//! Both traits are object safe so the engine can hold `Arc<dyn ...>` and
//! stay agnostic of where the rows live.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use data_loader::{EventId, EventSimilarity, UserAction, UserId};
use futures::future::try_join_all;

use crate::error::Result;

/// Read-only access to the user interaction log.
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// The user's most recent `limit` actions, newest first.
    async fn top_by_user(&self, user_id: UserId, limit: usize) -> Result<Vec<UserAction>>;

    /// Every action, from any user, on any of `event_ids`.
    async fn by_event_ids(&self, event_ids: &HashSet<EventId>) -> Result<Vec<UserAction>>;

    /// Events the user interacted with, minus `exclude_event_id`.
    async fn distinct_event_ids_by_user_excluding(
        &self,
        user_id: UserId,
        exclude_event_id: EventId,
    ) -> Result<HashSet<EventId>>;
}

/// Read-only access to the precomputed similarity catalog.
#[async_trait]
pub trait SimilarityStore: Send + Sync {
    /// Rows linking exactly one seed to a non-seed event, best score first,
    /// at most `limit` of them.
    async fn newly_relevant(
        &self,
        seeds: &HashSet<EventId>,
        limit: usize,
    ) -> Result<Vec<EventSimilarity>>;

    /// Every row with `event_id` as either endpoint.
    async fn by_event_id(&self, event_id: EventId) -> Result<Vec<EventSimilarity>>;

    /// The `k` best rows touching `event_id`, score descending. Ties keep
    /// storage order.
    async fn top_neighbors(&self, event_id: EventId, k: usize) -> Result<Vec<EventSimilarity>>;

    /// [`SimilarityStore::top_neighbors`] for many events at once.
    ///
    /// The default issues all lookups concurrently and fails as a whole if
    /// any of them fails. Backends that can answer in one round trip should
    /// override it.
    async fn top_neighbors_batch(
        &self,
        event_ids: &[EventId],
        k: usize,
    ) -> Result<HashMap<EventId, Vec<EventSimilarity>>> {
        let lookups = event_ids.iter().map(|&event_id| async move {
            self.top_neighbors(event_id, k)
                .await
                .map(|rows| (event_id, rows))
        });
        let resolved = try_join_all(lookups).await?;
        Ok(resolved.into_iter().collect())
    }
}
