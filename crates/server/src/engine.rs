//! # Recommendation Engine
//!
//! Serves the three read operations of the recommendation core:
//! 1. Personalized recommendations for a user
//! 2. Events similar to a given event, minus what the user already saw
//! 3. Summed interaction weight for a set of events
//!
//! The engine holds nothing but shared store handles. Every call is an
//! independent unit of work, so one engine can be cloned into any number of
//! concurrent tasks.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use data_loader::{ActivityIndex, EventId, RecommendedEvent};
use pipeline::{NeighborResolver, ScorePredictor, exclude_seen, top_by_score};
use stores::{ActionStore, MemoryStore, SimilarityStore};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::requests::{
    InteractionsCountRequest, SimilarEventsRequest, UserPredictionsRequest, result_limit,
};
use crate::response;

/// Main entry point of the recommendation core
#[derive(Clone)]
pub struct RecommendationEngine {
    actions: Arc<dyn ActionStore>,
    similarities: Arc<dyn SimilarityStore>,
    predictor: ScorePredictor,
}

impl RecommendationEngine {
    /// Create an engine over the two read-only collaborators
    pub fn new(actions: Arc<dyn ActionStore>, similarities: Arc<dyn SimilarityStore>) -> Self {
        let resolver = NeighborResolver::new(similarities.clone());
        let predictor = ScorePredictor::new(resolver, actions.clone());
        Self {
            actions,
            similarities,
            predictor,
        }
    }

    /// Create an engine whose stores are both served from one in-memory index
    pub fn with_memory_store(index: Arc<ActivityIndex>) -> Self {
        let store = Arc::new(MemoryStore::new(index));
        Self::new(store.clone(), store)
    }

    /// Predicted-affinity recommendations for a user.
    ///
    /// Records come back in ascending event id order, not ranked by score.
    /// A user without recorded actions gets an empty response.
    #[instrument(skip(self, request), fields(user_id = request.user_id))]
    pub async fn get_recommendations_for_user(
        &self,
        request: &UserPredictionsRequest,
    ) -> Result<Vec<RecommendedEvent>> {
        let start_time = Instant::now();
        let limit = result_limit(request.max_results)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let recent = self.actions.top_by_user(request.user_id, limit).await?;
        let user_events: HashSet<EventId> = recent.iter().map(|a| a.event_id).collect();
        if user_events.is_empty() {
            info!("No recent actions for user {}", request.user_id);
            return Ok(Vec::new());
        }

        let rows = self.similarities.newly_relevant(&user_events, limit).await?;
        debug!(
            "{} seed events produced {} similarity rows",
            user_events.len(),
            rows.len()
        );

        let scores = self
            .predictor
            .predict_scores(request.user_id, &rows, &user_events)
            .await?;
        let recommendations = response::from_scores(scores);

        info!(
            "Recommended {} events for user {} in {:.2?}",
            recommendations.len(),
            request.user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Events most similar to `event_id` that the user has not interacted
    /// with yet, best similarity first, at most `max_results` of them.
    #[instrument(
        skip(self, request),
        fields(user_id = request.user_id, event_id = request.event_id)
    )]
    pub async fn get_similar_events(
        &self,
        request: &SimilarEventsRequest,
    ) -> Result<Vec<RecommendedEvent>> {
        let limit = result_limit(request.max_results)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let (rows, seen) = tokio::try_join!(
            self.similarities.by_event_id(request.event_id),
            self.actions
                .distinct_event_ids_by_user_excluding(request.user_id, request.event_id),
        )?;
        let total = rows.len();

        let ranked = top_by_score(exclude_seen(rows, &seen), limit);
        debug!(
            "Kept {} of {} similarity rows after excluding {} seen events",
            ranked.len(),
            total,
            seen.len()
        );

        Ok(response::from_similarities(&ranked, request.event_id))
    }

    /// Summed weight of all interactions per requested event.
    ///
    /// Events without actions, or whose weights sum to exactly zero, are
    /// left out. Records come back in ascending event id order.
    #[instrument(skip(self, request), fields(requested = request.event_ids.len()))]
    pub async fn get_interactions_count(
        &self,
        request: &InteractionsCountRequest,
    ) -> Result<Vec<RecommendedEvent>> {
        let event_ids: HashSet<EventId> = request.event_ids.iter().copied().collect();
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        let actions = self.actions.by_event_ids(&event_ids).await?;

        let mut sum_by_event: BTreeMap<EventId, f64> = BTreeMap::new();
        for action in actions.iter().filter(|a| event_ids.contains(&a.event_id)) {
            *sum_by_event.entry(action.event_id).or_insert(0.0) += action.weight;
        }
        sum_by_event.retain(|_, sum| *sum != 0.0);

        debug!(
            "{} of {} events have recorded interactions",
            sum_by_event.len(),
            event_ids.len()
        );
        Ok(response::from_scores(sum_by_event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use data_loader::{EventSimilarity, UserAction, UserId};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn action(user_id: UserId, event_id: EventId, weight: f64, timestamp: i64) -> UserAction {
        UserAction {
            user_id,
            event_id,
            weight,
            timestamp,
        }
    }

    fn build_test_engine() -> RecommendationEngine {
        let index = ActivityIndex::from_records(
            vec![
                action(1, 1, 3.0, 100),
                action(1, 2, 1.0, 200),
                action(2, 10, 2.0, 100),
                action(3, 10, 3.0, 100),
                action(3, 11, 0.0, 100),
            ],
            vec![
                EventSimilarity::new(1, 5, 0.9),
                EventSimilarity::new(2, 5, 0.4),
                EventSimilarity::new(1, 2, 0.8),
                EventSimilarity::new(6, 1, 0.2),
            ],
        );
        RecommendationEngine::with_memory_store(Arc::new(index))
    }

    // ============================================================================
    // get_recommendations_for_user
    // ============================================================================

    #[tokio::test]
    async fn test_recommendations_weighted_average() {
        let engine = build_test_engine();

        let recs = engine
            .get_recommendations_for_user(&UserPredictionsRequest {
                user_id: 1,
                max_results: 10,
            })
            .await
            .unwrap();

        // Candidates 5 and 6; 1 and 2 are already known
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].event_id, 5);
        assert!((recs[0].score - (3.0 * 0.9 + 1.0 * 0.4) / 1.3).abs() < 1e-12);
        // Only neighbor of 6 is event 1 with weight 3
        assert_eq!(recs[1].event_id, 6);
        assert!((recs[1].score - 3.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_recommendations_unknown_user_is_empty() {
        let engine = build_test_engine();

        let recs = engine
            .get_recommendations_for_user(&UserPredictionsRequest {
                user_id: 404,
                max_results: 10,
            })
            .await
            .unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_negative_limit_rejected() {
        let engine = build_test_engine();

        let result = engine
            .get_recommendations_for_user(&UserPredictionsRequest {
                user_id: 1,
                max_results: -3,
            })
            .await;
        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    }

    // ============================================================================
    // get_similar_events
    // ============================================================================

    #[tokio::test]
    async fn test_similar_events_excludes_seen_and_sorts() {
        let engine = build_test_engine();

        let similar = engine
            .get_similar_events(&SimilarEventsRequest {
                user_id: 1,
                event_id: 1,
                max_results: 10,
            })
            .await
            .unwrap();

        // Event 2 was seen by user 1, so (1,2) is dropped
        assert_eq!(
            similar,
            vec![RecommendedEvent::new(5, 0.9), RecommendedEvent::new(6, 0.2)]
        );
    }

    #[tokio::test]
    async fn test_similar_events_truncates() {
        let engine = build_test_engine();

        let similar = engine
            .get_similar_events(&SimilarEventsRequest {
                user_id: 2,
                event_id: 1,
                max_results: 2,
            })
            .await
            .unwrap();

        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].event_id, 5);
        assert_eq!(similar[1].event_id, 2);
    }

    #[tokio::test]
    async fn test_similar_events_zero_limit() {
        let engine = build_test_engine();

        let similar = engine
            .get_similar_events(&SimilarEventsRequest {
                user_id: 2,
                event_id: 1,
                max_results: 0,
            })
            .await
            .unwrap();
        assert!(similar.is_empty());
    }

    // ============================================================================
    // get_interactions_count
    // ============================================================================

    #[tokio::test]
    async fn test_interactions_count_sums_and_omits_zero() {
        let engine = build_test_engine();

        let counts = engine
            .get_interactions_count(&InteractionsCountRequest {
                event_ids: vec![10, 11, 10, 12],
            })
            .await
            .unwrap();

        // 11 only has a zero-weight action, 12 has none at all
        assert_eq!(counts, vec![RecommendedEvent::new(10, 5.0)]);
    }

    #[tokio::test]
    async fn test_interactions_count_empty_request() {
        let engine = build_test_engine();

        let counts = engine
            .get_interactions_count(&InteractionsCountRequest { event_ids: vec![] })
            .await
            .unwrap();
        assert!(counts.is_empty());
    }
}
