//! Restaurants near a reference restaurant, sorted and paginated.

use std::cmp::Ordering;
use std::str::FromStr as _;

use restaurant_safety_geo::BoundingBox;
use restaurant_safety_restaurant_models::{Restaurant, SortOrder, SortType};
use restaurant_safety_scoring::overall_score;
use serde::Serialize;

use crate::{Page, Pagination, QueryError, RestaurantQueries, proximity::check_radius};

/// A validated nearby-restaurant request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    /// Reference restaurant.
    pub restaurant_id: i64,
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Requested page.
    pub pagination: Pagination,
    /// Sort key.
    pub sort_type: SortType,
    /// Direction of the sort key.
    pub sort_order: SortOrder,
}

impl NearbyQuery {
    /// Validates the radius and bundles the request.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParameter`] if `radius_km` is not
    /// positive or exceeds [`crate::MAX_RADIUS_KM`].
    pub fn new(
        restaurant_id: i64,
        radius_km: f64,
        pagination: Pagination,
        sort_type: SortType,
        sort_order: SortOrder,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            restaurant_id,
            radius_km: check_radius(radius_km)?,
            pagination,
            sort_type,
            sort_order,
        })
    }
}

/// Parses a `sortType` parameter.
///
/// # Errors
///
/// Returns [`QueryError::InvalidSortType`] for anything other than
/// `distance`, `overallScore` or `overallRanking`.
pub fn parse_sort_type(value: &str) -> Result<SortType, QueryError> {
    SortType::from_str(value).map_err(|_| QueryError::InvalidSortType(value.to_string()))
}

/// Parses a `sortOrder` parameter.
///
/// # Errors
///
/// Returns [`QueryError::InvalidSortOrder`] for anything other than `asc`
/// or `desc`.
pub fn parse_sort_order(value: &str) -> Result<SortOrder, QueryError> {
    SortOrder::from_str(value).map_err(|_| QueryError::InvalidSortOrder(value.to_string()))
}

/// A restaurant annotated with its distance and overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyRestaurant {
    /// The neighbouring restaurant.
    pub restaurant: Restaurant,
    /// Kilometres from the reference restaurant.
    pub distance: f64,
    /// Overall score derived from the stored component scores.
    pub overall_score: f64,
}

impl NearbyRestaurant {
    fn sort_key(&self, sort_type: SortType) -> f64 {
        match sort_type {
            SortType::Distance => self.distance,
            SortType::OverallScore => self.overall_score,
        }
    }
}

fn compare(
    a: &NearbyRestaurant,
    b: &NearbyRestaurant,
    sort_type: SortType,
    sort_order: SortOrder,
) -> Ordering {
    let primary = a.sort_key(sort_type).total_cmp(&b.sort_key(sort_type));
    let primary = match sort_order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };

    primary.then(a.restaurant.restaurant_id.cmp(&b.restaurant.restaurant_id))
}

impl RestaurantQueries {
    /// Other restaurants strictly within the radius of the reference
    /// restaurant, sorted and paginated.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the reference restaurant does not
    /// exist, or [`QueryError::Store`] if the store fails.
    pub async fn nearby_restaurants(
        &self,
        query: &NearbyQuery,
    ) -> Result<Page<NearbyRestaurant>, QueryError> {
        let center = self.resolve_reference_point(query.restaurant_id).await?;

        let candidates = self
            .store
            .restaurants_in_bbox(
                &BoundingBox::around(&center, query.radius_km),
                query.restaurant_id,
            )
            .await?;

        let mut nearby: Vec<NearbyRestaurant> = candidates
            .into_iter()
            .map(|restaurant| NearbyRestaurant {
                distance: center.distance_to(&restaurant.location),
                overall_score: overall_score(restaurant.inspection_score, restaurant.safety_score),
                restaurant,
            })
            .filter(|r| r.distance < query.radius_km)
            .collect();

        let total = nearby.len() as u64;
        log::debug!(
            "restaurant {}: {total} neighbour(s) within {} km",
            query.restaurant_id,
            query.radius_km
        );

        nearby.sort_by(|a, b| compare(a, b, query.sort_type, query.sort_order));

        Ok(Page::new(
            query.pagination.slice(nearby),
            total,
            query.pagination,
        ))
    }
}
