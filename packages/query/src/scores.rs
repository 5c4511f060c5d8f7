//! Restaurant scores, read from the store or recomputed from raw rows.

use restaurant_safety_geo::{BoundingBox, within_radius};
use restaurant_safety_restaurant_models::{CrimeFilter, RestaurantInfo};
use restaurant_safety_scoring::{
    CrimeRankTable, DEFAULT_SAFETY_RADIUS_KM, InspectionScoreTable, ScoreCard,
};
use serde::Serialize;

use crate::{Missing, QueryError, RestaurantQueries, proximity::check_radius};

/// Identity fields and scores of one restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantSummary {
    /// Name and address.
    pub info: RestaurantInfo,
    /// Stored scores.
    pub scores: ScoreCard,
}

impl RestaurantQueries {
    /// The materialized scores of a restaurant, with the overall score
    /// derived from them.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the restaurant does not exist, or
    /// [`QueryError::Store`] if the store fails.
    pub async fn stored_scores(&self, restaurant_id: i64) -> Result<ScoreCard, QueryError> {
        self.store
            .restaurant_scores(restaurant_id)
            .await?
            .map(ScoreCard::from)
            .ok_or(QueryError::NotFound(Missing::Restaurant))
    }

    /// Identity fields merged with stored scores.
    ///
    /// Both lookups are issued concurrently. A store failure in either one
    /// fails the whole summary.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if either half is missing, or
    /// [`QueryError::Store`] if the store fails.
    pub async fn restaurant_summary(
        &self,
        restaurant_id: i64,
    ) -> Result<RestaurantSummary, QueryError> {
        let (info, scores) = tokio::try_join!(
            self.store.restaurant_info(restaurant_id),
            self.store.restaurant_scores(restaurant_id),
        )?;

        match (info, scores) {
            (Some(info), Some(scores)) => Ok(RestaurantSummary {
                info,
                scores: scores.into(),
            }),
            _ => Err(QueryError::NotFound(Missing::Restaurant)),
        }
    }

    /// Mean inspection score over every inspection of the restaurant, looked
    /// up in the inspection score table. `0.0` when there are none.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the restaurant does not exist, or
    /// [`QueryError::Store`] if the store fails.
    pub async fn compute_inspection_score(&self, restaurant_id: i64) -> Result<f64, QueryError> {
        let (scores, inspections, table) = tokio::try_join!(
            self.store.restaurant_scores(restaurant_id),
            self.store.inspections(restaurant_id, None),
            self.store.inspection_score_table(),
        )?;

        if scores.is_none() {
            return Err(QueryError::NotFound(Missing::Restaurant));
        }

        let score = InspectionScoreTable::from_entries(table).score(&inspections);
        log::debug!(
            "restaurant {restaurant_id}: inspection score {score} from {} inspection(s)",
            inspections.len()
        );

        Ok(score)
    }

    /// Mean danger score of the crimes strictly within `radius_km` of the
    /// restaurant. `0.0` when there are none.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParameter`] for a radius that is not
    /// positive or exceeds [`crate::MAX_RADIUS_KM`],
    /// [`QueryError::NotFound`] if the restaurant does not exist, or
    /// [`QueryError::Store`] if the store fails.
    pub async fn compute_safety_score(
        &self,
        restaurant_id: i64,
        radius_km: f64,
    ) -> Result<f64, QueryError> {
        let radius_km = check_radius(radius_km)?;
        let center = self.resolve_reference_point(restaurant_id).await?;
        let bbox = BoundingBox::around(&center, radius_km);

        let filter = CrimeFilter::default();
        let (candidates, ranks) = tokio::try_join!(
            self.store.crimes_in_bbox(&bbox, &filter),
            self.store.crime_ranks(),
        )?;

        let in_radius: Vec<_> = candidates
            .iter()
            .filter(|crime| within_radius(&center, &crime.location, radius_km))
            .collect();

        let score = CrimeRankTable::from_ranks(ranks).score(in_radius.iter().copied());
        log::debug!(
            "restaurant {restaurant_id}: safety score {score} from {} crime(s) within {radius_km} km",
            in_radius.len()
        );

        Ok(score)
    }

    /// All three scores recomputed from raw inspections and crimes, using
    /// the default safety radius.
    ///
    /// # Errors
    ///
    /// See [`Self::compute_inspection_score`] and
    /// [`Self::compute_safety_score`].
    pub async fn recompute_scores(&self, restaurant_id: i64) -> Result<ScoreCard, QueryError> {
        let (inspection_score, safety_score) = tokio::try_join!(
            self.compute_inspection_score(restaurant_id),
            self.compute_safety_score(restaurant_id, DEFAULT_SAFETY_RADIUS_KM),
        )?;

        Ok(ScoreCard::new(inspection_score, safety_score))
    }
}
