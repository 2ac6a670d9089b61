//! Integration tests for the pipeline.
//!
//! These tests run the resolver and predictor against a `MemoryStore` and
//! against stores that fail, the way the engine uses them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use data_loader::{ActivityIndex, EventId, EventSimilarity, UserAction, UserId};
use pipeline::{NEIGHBOR_COUNT, NeighborResolver, ScorePredictor};
use stores::{ActionStore, MemoryStore, SimilarityStore, StoreError};

fn action(user_id: UserId, event_id: EventId, weight: f64) -> UserAction {
    UserAction {
        user_id,
        event_id,
        weight,
        timestamp: 0,
    }
}

fn create_test_store() -> Arc<MemoryStore> {
    // Event 100 has eight neighbors 1..=8 with rising similarity.
    // User 7 put weight 1 on all of them, user 9 only knows event 1.
    let similarities = (1..=8).map(|id| EventSimilarity::new(100, id, id as f64));
    let actions = (1..=8)
        .map(|id| action(7, id, 1.0))
        .chain([action(9, 1, 4.0)]);
    Arc::new(MemoryStore::new(Arc::new(ActivityIndex::from_records(
        actions,
        similarities,
    ))))
}

#[tokio::test]
async fn test_prediction_uses_only_top_neighbors() {
    let store = create_test_store();
    let predictor = ScorePredictor::new(NeighborResolver::new(store.clone()), store);

    let seeds: HashSet<EventId> = [1].into_iter().collect();
    let rows = vec![EventSimilarity::new(100, 1, 1.0)];

    // Event 1 is outside the top five (8, 7, 6, 5, 4), so user 9 scores 0
    let scores = predictor.predict_scores(9, &rows, &seeds).await.unwrap();
    assert_eq!(NEIGHBOR_COUNT, 5);
    assert_eq!(scores[&100], 0.0);

    // Weight 1 on every neighbor averages to exactly 1
    let scores = predictor.predict_scores(7, &rows, &seeds).await.unwrap();
    assert!((scores[&100] - 1.0).abs() < 1e-12);
}

/// Similarity store that records how often each lookup path is taken
struct CountingSimilarityStore {
    inner: Arc<MemoryStore>,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

#[async_trait]
impl SimilarityStore for CountingSimilarityStore {
    async fn newly_relevant(
        &self,
        seeds: &HashSet<EventId>,
        limit: usize,
    ) -> stores::Result<Vec<EventSimilarity>> {
        self.inner.newly_relevant(seeds, limit).await
    }

    async fn by_event_id(&self, event_id: EventId) -> stores::Result<Vec<EventSimilarity>> {
        self.inner.by_event_id(event_id).await
    }

    async fn top_neighbors(
        &self,
        event_id: EventId,
        k: usize,
    ) -> stores::Result<Vec<EventSimilarity>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.top_neighbors(event_id, k).await
    }

    async fn top_neighbors_batch(
        &self,
        event_ids: &[EventId],
        k: usize,
    ) -> stores::Result<HashMap<EventId, Vec<EventSimilarity>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.top_neighbors_batch(event_ids, k).await
    }
}

#[tokio::test]
async fn test_many_candidates_resolved_in_one_batch() {
    let inner = create_test_store();
    let counting = Arc::new(CountingSimilarityStore {
        inner: inner.clone(),
        single_calls: AtomicUsize::new(0),
        batch_calls: AtomicUsize::new(0),
    });
    let predictor = ScorePredictor::new(NeighborResolver::new(counting.clone()), inner);

    let seeds: HashSet<EventId> = [100].into_iter().collect();
    let rows: Vec<EventSimilarity> = (1..=8)
        .map(|id| EventSimilarity::new(100, id, id as f64))
        .collect();

    let scores = predictor.predict_scores(7, &rows, &seeds).await.unwrap();

    assert_eq!(scores.len(), 8);
    assert_eq!(counting.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(counting.single_calls.load(Ordering::SeqCst), 0);
}

/// Action store whose backend is down
struct UnavailableActionStore;

#[async_trait]
impl ActionStore for UnavailableActionStore {
    async fn top_by_user(&self, _user_id: UserId, _limit: usize) -> stores::Result<Vec<UserAction>> {
        Err(StoreError::Unavailable("actions offline".to_string()))
    }

    async fn by_event_ids(&self, _event_ids: &HashSet<EventId>) -> stores::Result<Vec<UserAction>> {
        Err(StoreError::Unavailable("actions offline".to_string()))
    }

    async fn distinct_event_ids_by_user_excluding(
        &self,
        _user_id: UserId,
        _exclude_event_id: EventId,
    ) -> stores::Result<HashSet<EventId>> {
        Err(StoreError::Unavailable("actions offline".to_string()))
    }
}

#[tokio::test]
async fn test_action_store_failure_propagates() {
    let store = create_test_store();
    let predictor = ScorePredictor::new(
        NeighborResolver::new(store),
        Arc::new(UnavailableActionStore),
    );

    let seeds: HashSet<EventId> = [1].into_iter().collect();
    let rows = vec![EventSimilarity::new(100, 1, 1.0)];

    let err = predictor.predict_scores(7, &rows, &seeds).await.unwrap_err();
    assert_eq!(err, StoreError::Unavailable("actions offline".to_string()));
}
