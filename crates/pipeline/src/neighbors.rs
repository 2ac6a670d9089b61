//! Neighbor resolution: the most similar events to a given event.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use data_loader::{EventId, EventSimilarity};
use stores::{Result, SimilarityStore};
use tracing::{debug, instrument};

/// Looks up top-k neighbors through the similarity store.
///
/// Ordering is whatever the store guarantees (score descending, ties in
/// storage order); the resolver only enforces the cap and the batching.
#[derive(Clone)]
pub struct NeighborResolver {
    similarities: Arc<dyn SimilarityStore>,
}

impl NeighborResolver {
    pub fn new(similarities: Arc<dyn SimilarityStore>) -> Self {
        Self { similarities }
    }

    /// Top `k` neighbors of a single event
    pub async fn top_neighbors(&self, event_id: EventId, k: usize) -> Result<Vec<EventSimilarity>> {
        let mut rows = self.similarities.top_neighbors(event_id, k).await?;
        rows.truncate(k);
        Ok(rows)
    }

    /// Top `k` neighbors for every candidate, fetched in one batched call.
    ///
    /// Duplicate candidates are collapsed. Every requested candidate has an
    /// entry in the result, possibly empty.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn resolve_batch(
        &self,
        candidates: &[EventId],
        k: usize,
    ) -> Result<HashMap<EventId, Vec<EventSimilarity>>> {
        let mut seen = HashSet::with_capacity(candidates.len());
        let unique: Vec<EventId> = candidates
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut neighbors = self.similarities.top_neighbors_batch(&unique, k).await?;
        for &event_id in &unique {
            neighbors.entry(event_id).or_default().truncate(k);
        }

        debug!(
            "Resolved neighbors for {} candidates ({} rows)",
            unique.len(),
            neighbors.values().map(|rows| rows.len()).sum::<usize>()
        );
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::ActivityIndex;
    use stores::MemoryStore;

    fn create_resolver() -> NeighborResolver {
        let index = ActivityIndex::from_records(
            vec![],
            (2..=9).map(|other| EventSimilarity::new(1, other, other as f64 / 10.0)),
        );
        NeighborResolver::new(Arc::new(MemoryStore::new(Arc::new(index))))
    }

    #[tokio::test]
    async fn test_top_neighbors_descending() {
        let resolver = create_resolver();

        let rows = resolver.top_neighbors(1, 3).await.unwrap();
        let ids: Vec<EventId> = rows.iter().map(|s| s.other(1)).collect();
        assert_eq!(ids, vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn test_resolve_batch_dedupes_and_fills_missing() {
        let resolver = create_resolver();

        let batch = resolver.resolve_batch(&[1, 1, 2, 100], 5).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[&1].len(), 5);
        assert_eq!(batch[&2].len(), 1);
        assert!(batch[&100].is_empty());
    }
}
