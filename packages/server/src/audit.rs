//! Stored-versus-recomputed score comparison for one restaurant.

use restaurant_safety_query::{QueryError, RestaurantQueries};
use restaurant_safety_scoring::ScoreCard;
use serde::Serialize;

/// Differences smaller than this are reported as matching.
pub const SCORE_TOLERANCE: f64 = 1e-6;

/// Stored scores of a restaurant next to scores recomputed from its
/// inspections and nearby crimes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Audited restaurant.
    pub restaurant_id: i64,
    /// Scores as materialized in the store.
    pub stored: ScoreCard,
    /// Scores recomputed from raw inspections and crimes.
    pub recomputed: ScoreCard,
}

impl AuditReport {
    /// `(label, stored, recomputed)` for each score.
    #[must_use]
    pub fn rows(&self) -> [(&'static str, f64, f64); 3] {
        [
            (
                "inspection",
                self.stored.inspection_score,
                self.recomputed.inspection_score,
            ),
            (
                "safety",
                self.stored.safety_score,
                self.recomputed.safety_score,
            ),
            (
                "overall",
                self.stored.overall_score,
                self.recomputed.overall_score,
            ),
        ]
    }

    /// Whether every stored score matches its recomputed value.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.rows()
            .iter()
            .all(|(_, stored, recomputed)| (stored - recomputed).abs() < SCORE_TOLERANCE)
    }
}

/// Loads the stored scores and recomputes them concurrently.
///
/// # Errors
///
/// Returns [`QueryError::NotFound`] if the restaurant does not exist, or
/// [`QueryError::Store`] if the store fails.
pub async fn audit_restaurant(
    queries: &RestaurantQueries,
    restaurant_id: i64,
) -> Result<AuditReport, QueryError> {
    let (stored, recomputed) = tokio::try_join!(
        queries.stored_scores(restaurant_id),
        queries.recompute_scores(restaurant_id),
    )?;

    let report = AuditReport {
        restaurant_id,
        stored,
        recomputed,
    };

    if !report.is_consistent() {
        log::warn!("restaurant {restaurant_id}: stored scores differ from recomputed scores");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use restaurant_safety_database::memory::MemoryStore;
    use restaurant_safety_geo::Coordinates;
    use restaurant_safety_query::Missing;
    use restaurant_safety_restaurant_models::{Inspection, InspectionScoreEntry, Restaurant};

    use super::*;

    fn store(stored_inspection: f64) -> MemoryStore {
        MemoryStore::new()
            .with_restaurant(Restaurant {
                restaurant_id: 1,
                restaurant_name: "Girl & the Goat".to_string(),
                restaurant_address: "809 W Randolph St".to_string(),
                location: Coordinates::new(41.884, -87.648),
                inspection_score: stored_inspection,
                safety_score: 0.0,
            })
            .with_inspection(Inspection {
                inspection_id: 1,
                restaurant_id: 1,
                inspection_date: NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
                inspection_type: None,
                risk_level: "Risk 1 (High)".to_string(),
                inspection_result: "Pass".to_string(),
            })
            .with_inspection_score(InspectionScoreEntry {
                risk_level: "Risk 1 (High)".to_string(),
                inspection_result: "Pass".to_string(),
                inspection_score: 90.0,
            })
    }

    #[tokio::test]
    async fn consistent_when_stored_matches_raw_rows() {
        let queries = RestaurantQueries::new(Arc::new(store(90.0)));
        let report = audit_restaurant(&queries, 1).await.unwrap();

        assert!(report.is_consistent());
        assert!((report.recomputed.overall_score - 45.0).abs() < SCORE_TOLERANCE);
    }

    #[tokio::test]
    async fn flags_stale_stored_scores() {
        let queries = RestaurantQueries::new(Arc::new(store(70.0)));
        let report = audit_restaurant(&queries, 1).await.unwrap();

        assert!(!report.is_consistent());
        let (label, stored, recomputed) = report.rows()[0];
        assert_eq!(label, "inspection");
        assert!((stored - 70.0).abs() < SCORE_TOLERANCE);
        assert!((recomputed - 90.0).abs() < SCORE_TOLERANCE);
    }

    #[tokio::test]
    async fn missing_restaurant_is_not_found() {
        let queries = RestaurantQueries::new(Arc::new(store(90.0)));

        assert!(matches!(
            audit_restaurant(&queries, 2).await,
            Err(QueryError::NotFound(Missing::Restaurant))
        ));
    }
}
