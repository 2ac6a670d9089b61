//! Conversion of engine results into response records.

use std::collections::BTreeMap;

use data_loader::{EventId, EventSimilarity, RecommendedEvent};

/// One record per similarity row, named by the endpoint that is not
/// `current_event`. Row order is preserved.
pub fn from_similarities(
    similarities: &[EventSimilarity],
    current_event: EventId,
) -> Vec<RecommendedEvent> {
    similarities
        .iter()
        .map(|s| RecommendedEvent::new(s.other(current_event), s.score))
        .collect()
}

/// One record per map entry, in the map's (ascending id) order
pub fn from_scores(scores: BTreeMap<EventId, f64>) -> Vec<RecommendedEvent> {
    scores
        .into_iter()
        .map(|(event_id, score)| RecommendedEvent::new(event_id, score))
        .collect()
}
