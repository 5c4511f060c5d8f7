//! Crimes near a restaurant.

use restaurant_safety_geo::BoundingBox;
use restaurant_safety_restaurant_models::{Crime, CrimeFilter};
use serde::Serialize;

use crate::{Missing, QueryError, RestaurantQueries};

/// A crime and its distance from the reference restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyCrime {
    /// The crime row.
    pub crime: Crime,
    /// Kilometres from the restaurant.
    pub distance: f64,
}

/// Largest accepted search radius. Anything wider would pull most of the
/// crime or restaurant table through the bounding-box pre-filter.
pub const MAX_RADIUS_KM: f64 = 50.0;

/// Accepts a search radius only if it is positive and at most
/// [`MAX_RADIUS_KM`].
pub(crate) fn check_radius(radius_km: f64) -> Result<f64, QueryError> {
    if radius_km > 0.0 && radius_km <= MAX_RADIUS_KM {
        Ok(radius_km)
    } else {
        Err(QueryError::InvalidParameter { name: "distance" })
    }
}

impl RestaurantQueries {
    /// Crimes strictly within `radius_km` of a restaurant, nearest first.
    ///
    /// Equal distances are ordered by crime id.
    ///
    /// # Errors
    ///
    /// * [`QueryError::InvalidParameter`] if the radius is not positive or
    ///   exceeds [`MAX_RADIUS_KM`]
    /// * [`QueryError::NotFound`] with [`Missing::Restaurant`] if the
    ///   restaurant does not exist
    /// * [`QueryError::NotFound`] with [`Missing::CrimesInArea`] if no crime
    ///   matches
    /// * [`QueryError::Store`] if the store fails
    pub async fn crimes_near_restaurant(
        &self,
        restaurant_id: i64,
        radius_km: f64,
        filter: &CrimeFilter,
    ) -> Result<Vec<NearbyCrime>, QueryError> {
        let radius_km = check_radius(radius_km)?;
        let center = self.resolve_reference_point(restaurant_id).await?;

        let candidates = self
            .store
            .crimes_in_bbox(&BoundingBox::around(&center, radius_km), filter)
            .await?;
        let candidate_count = candidates.len();

        let mut nearby: Vec<NearbyCrime> = candidates
            .into_iter()
            .map(|crime| NearbyCrime {
                distance: center.distance_to(&crime.location),
                crime,
            })
            .filter(|c| c.distance < radius_km)
            .collect();

        log::debug!(
            "restaurant {restaurant_id}: {} of {candidate_count} candidate crime(s) within {radius_km} km",
            nearby.len()
        );

        if nearby.is_empty() {
            return Err(QueryError::NotFound(Missing::CrimesInArea));
        }

        nearby.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.crime.crime_id.cmp(&b.crime.crime_id))
        });

        Ok(nearby)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use restaurant_safety_database::memory::MemoryStore;

    use super::*;
    use crate::test_support::{ORIGIN, crime, north_of, queries, restaurant};

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_restaurant(restaurant(1, "Portillo's", ORIGIN))
            .with_crime(crime(10, "THEFT", "2021-04-01", false, "STREET", north_of(ORIGIN, 0.3)))
            .with_crime(crime(11, "BATTERY", "2020-04-01", true, "SIDEWALK", north_of(ORIGIN, 0.1)))
            .with_crime(crime(12, "THEFT", "2021-07-01", false, "STREET", north_of(ORIGIN, 0.1)))
            .with_crime(crime(13, "THEFT", "2021-08-01", false, "STREET", north_of(ORIGIN, 1.2)))
    }

    #[tokio::test]
    async fn returns_crimes_inside_radius_nearest_first() {
        let store = Arc::new(store());
        let crimes = queries(&store)
            .crimes_near_restaurant(1, 0.5, &CrimeFilter::default())
            .await
            .unwrap();

        let ids: Vec<i64> = crimes.iter().map(|c| c.crime.crime_id).collect();
        assert_eq!(ids, vec![11, 12, 10]);
        assert!((crimes[2].distance - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn applies_type_and_year_filters() {
        let store = Arc::new(store());
        let filter = CrimeFilter {
            crime_type: Some("THEFT".to_string()),
            year: Some(2021),
        };
        let crimes = queries(&store)
            .crimes_near_restaurant(1, 0.5, &filter)
            .await
            .unwrap();

        let ids: Vec<i64> = crimes.iter().map(|c| c.crime.crime_id).collect();
        assert_eq!(ids, vec![12, 10]);
    }

    #[tokio::test]
    async fn empty_area_is_distinct_from_missing_restaurant() {
        let store = Arc::new(store());
        let q = queries(&store);

        assert!(matches!(
            q.crimes_near_restaurant(1, 0.05, &CrimeFilter::default()).await,
            Err(QueryError::NotFound(Missing::CrimesInArea))
        ));
        assert!(matches!(
            q.crimes_near_restaurant(2, 0.5, &CrimeFilter::default()).await,
            Err(QueryError::NotFound(Missing::Restaurant))
        ));
        assert_eq!(store.call_count("crimes_in_bbox"), 1);
    }

    #[tokio::test]
    async fn rejects_radius_outside_accepted_range() {
        let store = Arc::new(store());
        let q = queries(&store);

        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY, MAX_RADIUS_KM + 0.001, 100_000.0] {
            assert!(matches!(
                q.crimes_near_restaurant(1, radius, &CrimeFilter::default()).await,
                Err(QueryError::InvalidParameter { name: "distance" })
            ));
        }
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn accepts_the_maximum_radius() {
        let store = Arc::new(store());
        let crimes = queries(&store)
            .crimes_near_restaurant(1, MAX_RADIUS_KM, &CrimeFilter::default())
            .await
            .unwrap();

        assert_eq!(crimes.len(), 4);
    }
}
