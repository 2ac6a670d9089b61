//! Candidate exclusion and top-K selection over similarity rows.

use std::collections::HashSet;

use data_loader::{EventId, EventSimilarity};

/// Drops every row that touches an already-seen event.
///
/// `seen` must not contain the queried event itself, otherwise every row
/// would be dropped.
pub fn exclude_seen(
    similarities: Vec<EventSimilarity>,
    seen: &HashSet<EventId>,
) -> Vec<EventSimilarity> {
    similarities
        .into_iter()
        .filter(|s| !(seen.contains(&s.event_a) || seen.contains(&s.event_b)))
        .collect()
}

/// Best `limit` rows by score, descending. Equal scores keep input order.
pub fn top_by_score(mut similarities: Vec<EventSimilarity>, limit: usize) -> Vec<EventSimilarity> {
    similarities.sort_by(EventSimilarity::by_score_desc);
    similarities.truncate(limit);
    similarities
}
