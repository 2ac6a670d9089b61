//! Core domain types for the event recommendation engine.
//!
//! Two kinds of records are read by the engine, never written:
//! - [`UserAction`]: one weighted interaction of a user with an event
//! - [`EventSimilarity`]: a precomputed, undirected similarity between two events
//!
//! [`RecommendedEvent`] is the only output record.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = i64;

/// Unique identifier for an event
pub type EventId = i64;

// =============================================================================
// Interaction log
// =============================================================================

/// A single weighted interaction of a user with an event.
///
/// Several actions for the same (user, event) may coexist; consumers that
/// need a per-event figure sum the weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserAction {
    pub user_id: UserId,
    pub event_id: EventId,
    /// Caller-defined magnitude of interest (view=1, like=2, register=4, ...)
    pub weight: f64,
    /// Epoch millis. Only used for ordering.
    pub timestamp: i64,
}

// =============================================================================
// Similarity catalog
// =============================================================================

/// Symmetric similarity between two distinct events.
///
/// The pair is unordered: `(a, b, s)` and `(b, a, s)` describe the same
/// relation. Use [`EventSimilarity::other`] instead of reading `event_a` /
/// `event_b` directly whenever one endpoint is already known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventSimilarity {
    pub event_a: EventId,
    pub event_b: EventId,
    /// Higher is more similar. No fixed bound.
    pub score: f64,
}

impl EventSimilarity {
    pub fn new(event_a: EventId, event_b: EventId, score: f64) -> Self {
        Self {
            event_a,
            event_b,
            score,
        }
    }

    /// The endpoint opposite to `known`.
    ///
    /// Returns `event_b` when `known == event_a`, otherwise `event_a`.
    pub fn other(&self, known: EventId) -> EventId {
        if self.event_a == known {
            self.event_b
        } else {
            self.event_a
        }
    }

    /// True if `event_id` is one of the two endpoints
    pub fn involves(&self, event_id: EventId) -> bool {
        self.event_a == event_id || self.event_b == event_id
    }

    /// Comparator for "score descending". Incomparable scores compare equal,
    /// so a stable sort keeps their storage order.
    pub fn by_score_desc(a: &Self, b: &Self) -> Ordering {
        b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
    }

    /// Normalized unordered pair `(min, max)`, used as a uniqueness key
    pub fn pair(&self) -> (EventId, EventId) {
        if self.event_a <= self.event_b {
            (self.event_a, self.event_b)
        } else {
            (self.event_b, self.event_a)
        }
    }
}

// =============================================================================
// Output record
// =============================================================================

/// One entry of an engine response: an event and its score.
///
/// What `score` means depends on the operation: a predicted affinity, a
/// similarity score, or a summed interaction weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedEvent {
    pub event_id: EventId,
    pub score: f64,
}

impl RecommendedEvent {
    pub fn new(event_id: EventId, score: f64) -> Self {
        Self { event_id, score }
    }
}

// =============================================================================
// ActivityIndex - in-memory copy of both record sets
// =============================================================================

/// Holds the interaction log and the similarity catalog with lookup indices.
///
/// Every `Vec` keeps insertion order, which is what "storage order" means for
/// tie-breaking in the store layer.
#[derive(Debug, Default)]
pub struct ActivityIndex {
    /// All actions performed by each user
    pub(crate) user_actions: HashMap<UserId, Vec<UserAction>>,
    /// All actions recorded against each event
    pub(crate) event_actions: HashMap<EventId, Vec<UserAction>>,

    /// Every similarity row, in insertion order
    pub(crate) similarities: Vec<EventSimilarity>,
    /// Rows touching each event (both endpoints are indexed)
    pub(crate) event_similarities: HashMap<EventId, Vec<EventSimilarity>>,
    /// Unordered pairs seen so far, for the at-most-once invariant
    pub(crate) pairs: HashSet<(EventId, EventId)>,
    /// Number of rows that repeated an already-known pair
    pub(crate) duplicate_pairs: usize,
}

impl ActivityIndex {
    /// Creates a new, empty ActivityIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// All actions made by a user, in insertion order
    pub fn actions_by_user(&self, user_id: UserId) -> &[UserAction] {
        self.user_actions
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All actions recorded for an event, in insertion order
    pub fn actions_by_event(&self, event_id: EventId) -> &[UserAction] {
        self.event_actions
            .get(&event_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every similarity row that has `event_id` as either endpoint
    pub fn similarities_of(&self, event_id: EventId) -> &[EventSimilarity] {
        self.event_similarities
            .get(&event_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every user with at least one action, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_actions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The whole catalog in insertion order
    pub fn similarities(&self) -> &[EventSimilarity] {
        &self.similarities
    }

    /// Insert an action and update both action indices
    pub fn insert_action(&mut self, action: UserAction) {
        self.user_actions
            .entry(action.user_id)
            .or_default()
            .push(action);

        self.event_actions
            .entry(action.event_id)
            .or_default()
            .push(action);
    }

    /// Insert a similarity row, indexing it under both endpoints.
    ///
    /// A self-pair is indexed once. Repeated pairs are kept but counted so
    /// that [`ActivityIndex::validate`] can reject the catalog.
    pub fn insert_similarity(&mut self, similarity: EventSimilarity) {
        if !self.pairs.insert(similarity.pair()) {
            self.duplicate_pairs += 1;
        }

        self.similarities.push(similarity);
        self.event_similarities
            .entry(similarity.event_a)
            .or_default()
            .push(similarity);
        if similarity.event_b != similarity.event_a {
            self.event_similarities
                .entry(similarity.event_b)
                .or_default()
                .push(similarity);
        }
    }

    /// (users, actions, similarity rows)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_actions = self.user_actions.values().map(|v| v.len()).sum();
        (
            self.user_actions.len(),
            total_actions,
            self.similarities.len(),
        )
    }
}
