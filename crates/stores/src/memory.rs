//! In-memory store backed by a shared [`ActivityIndex`].
//!
//! Used by the CLI, the demo binary, benchmarks and tests. Lookups never
//! fail; the `Result` return type only exists to satisfy the store traits.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use data_loader::{ActivityIndex, EventId, EventSimilarity, UserAction, UserId};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::traits::{ActionStore, SimilarityStore};

/// Serves both store contracts from one read-only index.
#[derive(Clone)]
pub struct MemoryStore {
    /// Shared reference to the index (read-only, so no Mutex needed)
    index: Arc<ActivityIndex>,
}

impl MemoryStore {
    pub fn new(index: Arc<ActivityIndex>) -> Self {
        Self { index }
    }

    /// Stable score-descending top-k over the rows touching `event_id`
    fn neighbors_of(&self, event_id: EventId, k: usize) -> Vec<EventSimilarity> {
        let mut rows = self.index.similarities_of(event_id).to_vec();
        rows.sort_by(EventSimilarity::by_score_desc);
        rows.truncate(k);
        rows
    }
}

/// Set contents in ascending order, so results never depend on hash order
fn sorted(ids: &HashSet<EventId>) -> Vec<EventId> {
    let mut ids: Vec<EventId> = ids.iter().copied().collect();
    ids.sort_unstable();
    ids
}

#[async_trait]
impl ActionStore for MemoryStore {
    #[instrument(skip(self))]
    async fn top_by_user(&self, user_id: UserId, limit: usize) -> Result<Vec<UserAction>> {
        let mut actions = self.index.actions_by_user(user_id).to_vec();
        actions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        actions.truncate(limit);
        debug!("Found {} recent actions", actions.len());
        Ok(actions)
    }

    async fn by_event_ids(&self, event_ids: &HashSet<EventId>) -> Result<Vec<UserAction>> {
        let actions = sorted(event_ids)
            .into_iter()
            .flat_map(|event_id| self.index.actions_by_event(event_id).iter().copied())
            .collect();
        Ok(actions)
    }

    async fn distinct_event_ids_by_user_excluding(
        &self,
        user_id: UserId,
        exclude_event_id: EventId,
    ) -> Result<HashSet<EventId>> {
        Ok(self
            .index
            .actions_by_user(user_id)
            .iter()
            .map(|a| a.event_id)
            .filter(|&event_id| event_id != exclude_event_id)
            .collect())
    }
}

#[async_trait]
impl SimilarityStore for MemoryStore {
    #[instrument(skip(self, seeds), fields(seed_count = seeds.len()))]
    async fn newly_relevant(
        &self,
        seeds: &HashSet<EventId>,
        limit: usize,
    ) -> Result<Vec<EventSimilarity>> {
        // A row with exactly one seed endpoint is reachable from that seed
        // only, so walking the seeds visits each qualifying row once.
        let mut rows: Vec<EventSimilarity> = sorted(seeds)
            .into_iter()
            .flat_map(|seed| self.index.similarities_of(seed).iter().copied())
            .filter(|s| seeds.contains(&s.event_a) != seeds.contains(&s.event_b))
            .collect();

        rows.sort_by(EventSimilarity::by_score_desc);
        rows.truncate(limit);
        debug!("Found {} newly relevant similarity rows", rows.len());
        Ok(rows)
    }

    async fn by_event_id(&self, event_id: EventId) -> Result<Vec<EventSimilarity>> {
        Ok(self.index.similarities_of(event_id).to_vec())
    }

    async fn top_neighbors(&self, event_id: EventId, k: usize) -> Result<Vec<EventSimilarity>> {
        Ok(self.neighbors_of(event_id, k))
    }

    async fn top_neighbors_batch(
        &self,
        event_ids: &[EventId],
        k: usize,
    ) -> Result<HashMap<EventId, Vec<EventSimilarity>>> {
        Ok(event_ids
            .iter()
            .map(|&event_id| (event_id, self.neighbors_of(event_id, k)))
            .collect())
    }
}
