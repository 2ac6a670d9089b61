//! Score prediction for candidate events.
//!
//! ## Algorithm
//! For every candidate reached through the seed similarity rows:
//! 1. Take its `NEIGHBOR_COUNT` most similar events
//! 2. Look up how much weight the requesting user put on each neighbor
//! 3. Predicted score = Σ(weight × similarity) / Σ(similarity)
//!
//! A candidate whose neighbors carry no similarity at all scores 0.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use data_loader::{EventId, EventSimilarity, UserAction, UserId};
use rayon::prelude::*;
use stores::{ActionStore, Result};
use tracing::{debug, instrument};

use crate::neighbors::NeighborResolver;

/// How many neighbors feed into one predicted score
pub const NEIGHBOR_COUNT: usize = 5;

/// Picks the candidate endpoint of a seed similarity row.
///
/// The candidate is the endpoint the user has not interacted with. Rows
/// where both endpoints are known, or neither is, have no well-defined
/// candidate and yield `None`.
pub fn select_candidate(
    similarity: &EventSimilarity,
    user_events: &HashSet<EventId>,
) -> Option<EventId> {
    match (
        user_events.contains(&similarity.event_a),
        user_events.contains(&similarity.event_b),
    ) {
        (true, false) => Some(similarity.event_b),
        (false, true) => Some(similarity.event_a),
        _ => None,
    }
}

/// Neighbor-weighted average of the user's weights.
///
/// `weights` maps event id to the user's total weight on that event; missing
/// events count as 0.
pub fn predicted_score(
    candidate: EventId,
    neighbors: &[EventSimilarity],
    weights: &HashMap<EventId, f64>,
) -> f64 {
    let (weighted_sum, similarity_sum) =
        neighbors
            .iter()
            .fold((0.0, 0.0), |(weighted, total), neighbor| {
                let weight = weights
                    .get(&neighbor.other(candidate))
                    .copied()
                    .unwrap_or(0.0);
                (weighted + weight * neighbor.score, total + neighbor.score)
            });

    if similarity_sum == 0.0 {
        0.0
    } else {
        weighted_sum / similarity_sum
    }
}

/// Sums one user's weights per event, ignoring everyone else's actions
pub fn user_weights(user_id: UserId, actions: &[UserAction]) -> HashMap<EventId, f64> {
    let mut weights: HashMap<EventId, f64> = HashMap::new();
    for action in actions.iter().filter(|a| a.user_id == user_id) {
        *weights.entry(action.event_id).or_insert(0.0) += action.weight;
    }
    weights
}

/// Turns seed similarity rows into predicted scores for one user.
#[derive(Clone)]
pub struct ScorePredictor {
    resolver: NeighborResolver,
    actions: Arc<dyn ActionStore>,
}

impl ScorePredictor {
    pub fn new(resolver: NeighborResolver, actions: Arc<dyn ActionStore>) -> Self {
        Self { resolver, actions }
    }

    /// Predict a score for every distinct candidate in `similarities`.
    ///
    /// Issues exactly two store reads regardless of the candidate count: one
    /// batched neighbor lookup and one action lookup over all neighbors.
    /// The returned map iterates in ascending event id order.
    #[instrument(
        skip(self, similarities, user_events),
        fields(rows = similarities.len(), user_events = user_events.len())
    )]
    pub async fn predict_scores(
        &self,
        user_id: UserId,
        similarities: &[EventSimilarity],
        user_events: &HashSet<EventId>,
    ) -> Result<BTreeMap<EventId, f64>> {
        let mut skipped = 0usize;
        let mut candidates: Vec<EventId> = Vec::new();
        let mut seen = HashSet::new();
        for similarity in similarities {
            match select_candidate(similarity, user_events) {
                Some(candidate) => {
                    if seen.insert(candidate) {
                        candidates.push(candidate);
                    }
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("Skipped {} rows without a single unseen endpoint", skipped);
        }
        if candidates.is_empty() {
            return Ok(BTreeMap::new());
        }

        let neighbors = self
            .resolver
            .resolve_batch(&candidates, NEIGHBOR_COUNT)
            .await?;

        let neighbor_ids: HashSet<EventId> = neighbors
            .iter()
            .flat_map(|(&candidate, rows)| rows.iter().map(move |row| row.other(candidate)))
            .collect();
        let actions = self.actions.by_event_ids(&neighbor_ids).await?;
        let weights = user_weights(user_id, &actions);

        let scores: BTreeMap<EventId, f64> = candidates
            .par_iter()
            .map(|&candidate| {
                let rows = neighbors.get(&candidate).map(Vec::as_slice).unwrap_or(&[]);
                (candidate, predicted_score(candidate, rows, &weights))
            })
            .collect();

        debug!("Predicted scores for {} candidates", scores.len());
        Ok(scores)
    }
}
