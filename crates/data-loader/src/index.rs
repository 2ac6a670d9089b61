//! ActivityIndex building and validation.
//!
//! Loading runs both parsers in parallel, fills the index, then checks the
//! data model invariants before handing the index out.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

impl ActivityIndex {
    /// Load the interaction log and similarity catalog from a directory
    ///
    /// Expects `actions.dat` and `similarities.dat` inside `data_dir`.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading event activity from {:?}", data_dir);

        let actions_path = data_dir.join("actions.dat");
        let similarities_path = data_dir.join("similarities.dat");

        let (actions, similarities) = rayon::join(
            || parser::parse_actions(&actions_path),
            || parser::parse_similarities(&similarities_path),
        );
        let actions = actions?;
        let similarities = similarities?;

        info!(
            "Parsed {} actions and {} similarity rows",
            actions.len(),
            similarities.len()
        );

        let index = Self::from_records(actions, similarities);
        index.validate()?;

        debug!("ActivityIndex built and validated");
        Ok(index)
    }

    /// Build an index from already-parsed records without validating
    pub fn from_records(
        actions: impl IntoIterator<Item = UserAction>,
        similarities: impl IntoIterator<Item = EventSimilarity>,
    ) -> Self {
        let mut index = ActivityIndex::new();
        for action in actions {
            index.insert_action(action);
        }
        for similarity in similarities {
            index.insert_similarity(similarity);
        }
        index
    }

    /// Validate data integrity
    ///
    /// Checks that:
    /// - every weight is finite and non-negative
    /// - every similarity links two distinct events with a finite score
    /// - no unordered pair appears twice
    pub fn validate(&self) -> Result<()> {
        let bad_weight = self
            .user_actions
            .par_iter()
            .flat_map(|(_, actions)| actions.par_iter())
            .find_any(|a| !a.weight.is_finite() || a.weight < 0.0);
        if let Some(action) = bad_weight {
            return Err(DataLoadError::InvalidValue {
                field: "weight".to_string(),
                value: action.weight.to_string(),
            });
        }

        for similarity in self.similarities() {
            if similarity.event_a == similarity.event_b {
                return Err(DataLoadError::ValidationError(format!(
                    "similarity links event {} to itself",
                    similarity.event_a
                )));
            }
            if !similarity.score.is_finite() {
                return Err(DataLoadError::InvalidValue {
                    field: "score".to_string(),
                    value: similarity.score.to_string(),
                });
            }
        }

        if self.duplicate_pairs > 0 {
            return Err(DataLoadError::ValidationError(format!(
                "{} similarity rows repeat an existing event pair",
                self.duplicate_pairs
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(user_id: UserId, event_id: EventId, weight: f64) -> UserAction {
        UserAction {
            user_id,
            event_id,
            weight,
            timestamp: 0,
        }
    }

    #[test]
    fn test_valid_index() {
        let index = ActivityIndex::from_records(
            vec![action(1, 1, 3.0), action(1, 2, 1.0)],
            vec![EventSimilarity::new(1, 5, 0.9), EventSimilarity::new(2, 5, 0.4)],
        );
        assert!(index.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let index = ActivityIndex::from_records(vec![action(1, 1, -1.0)], vec![]);
        let err = index.validate().unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { ref field, .. } if field == "weight"));
    }

    #[test]
    fn test_self_similarity_rejected() {
        let index = ActivityIndex::from_records(vec![], vec![EventSimilarity::new(3, 3, 1.0)]);
        assert!(matches!(
            index.validate(),
            Err(DataLoadError::ValidationError(_))
        ));
    }

    #[test]
    fn test_reversed_duplicate_pair_rejected() {
        let index = ActivityIndex::from_records(
            vec![],
            vec![EventSimilarity::new(1, 2, 0.5), EventSimilarity::new(2, 1, 0.7)],
        );
        let err = index.validate().unwrap_err();
        assert!(err.to_string().contains("repeat"));
    }

    #[test]
    fn test_nan_score_rejected() {
        let index =
            ActivityIndex::from_records(vec![], vec![EventSimilarity::new(1, 2, f64::NAN)]);
        assert!(index.validate().is_err());
    }

    #[test]
    fn test_load_missing_directory() {
        let result = ActivityIndex::load_from_files(Path::new("/no/such/activity/dir"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
