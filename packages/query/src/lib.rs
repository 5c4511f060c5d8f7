#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Score aggregation and geo-proximity queries.
//!
//! [`RestaurantQueries`] is the orchestrator behind every API endpoint. It
//! owns a shared [`RestaurantStore`] and sequences the store calls each
//! operation needs:
//!
//! - lookups that depend on each other (a restaurant's coordinates before
//!   a proximity search) run one after another;
//! - independent lookups (identity fields and scores for the summary view)
//!   run concurrently and are joined;
//! - the first failing lookup decides the error, so no operation ever
//!   returns a partial result.
//!
//! Distances, radius filters, sorting, and pagination of proximity results
//! happen here rather than in the store, using
//! [`restaurant_safety_geo::distance_km`].

pub mod envelope;
pub mod error;
pub mod nearby;
pub mod proximity;
pub mod scores;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use restaurant_safety_database::RestaurantStore;
use restaurant_safety_geo::Coordinates;
use restaurant_safety_restaurant_models::{
    Crime, CrimeRank, Inspection, RestaurantInfo, RestaurantStub,
};

pub use envelope::{Page, Pagination};
pub use error::{ErrorKind, Missing, QueryError};
pub use nearby::{NearbyQuery, NearbyRestaurant, parse_sort_order, parse_sort_type};
pub use proximity::{MAX_RADIUS_KM, NearbyCrime};
pub use scores::RestaurantSummary;

/// Read-only query operations over an injected [`RestaurantStore`].
#[derive(Clone)]
pub struct RestaurantQueries {
    store: Arc<dyn RestaurantStore>,
}

impl RestaurantQueries {
    /// Creates the query layer over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    /// Case-insensitive substring search on restaurant names.
    ///
    /// When the requested page comes back empty the count query is skipped
    /// and an empty envelope with zero totals is returned.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Store`] if either store call fails.
    pub async fn search(
        &self,
        search: &str,
        pagination: Pagination,
    ) -> Result<Page<RestaurantStub>, QueryError> {
        let offset = u32::try_from(pagination.offset())
            .map_err(|_| QueryError::InvalidParameter { name: "page" })?;

        let rows = self
            .store
            .search_restaurants(search, pagination.page_size(), offset)
            .await?;

        if rows.is_empty() {
            log::debug!("search '{search}' matched nothing on page {}", pagination.page());
            return Ok(Page::empty(pagination));
        }

        let total = self.store.count_restaurants(search).await?;

        Ok(Page::new(rows, total, pagination))
    }

    /// Identity fields of one restaurant.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the restaurant does not exist, or
    /// [`QueryError::Store`] if the store fails.
    pub async fn restaurant_info(&self, restaurant_id: i64) -> Result<RestaurantInfo, QueryError> {
        self.store
            .restaurant_info(restaurant_id)
            .await?
            .ok_or(QueryError::NotFound(Missing::Restaurant))
    }

    /// Inspections of one restaurant, optionally for a single year.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if there are no matching
    /// inspections, or [`QueryError::Store`] if the store fails.
    pub async fn inspections(
        &self,
        restaurant_id: i64,
        year: Option<i32>,
    ) -> Result<Vec<Inspection>, QueryError> {
        let inspections = self.store.inspections(restaurant_id, year).await?;

        if inspections.is_empty() {
            return Err(QueryError::NotFound(Missing::Inspections));
        }

        Ok(inspections)
    }

    /// Raw rows for one crime.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the crime does not exist, or
    /// [`QueryError::Store`] if the store fails.
    pub async fn crime(&self, crime_id: i64) -> Result<Vec<Crime>, QueryError> {
        let crimes = self.store.crime(crime_id).await?;

        if crimes.is_empty() {
            return Err(QueryError::NotFound(Missing::Crime));
        }

        Ok(crimes)
    }

    /// The danger weighting that applies to one crime.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the crime does not exist or has
    /// no matching rank, or [`QueryError::Store`] if the store fails.
    pub async fn crime_rank(&self, crime_id: i64) -> Result<CrimeRank, QueryError> {
        self.store
            .crime_rank_for_crime(crime_id)
            .await?
            .ok_or(QueryError::NotFound(Missing::CrimeRank))
    }

    /// Coordinates of the restaurant every proximity query is centered on.
    async fn resolve_reference_point(&self, restaurant_id: i64) -> Result<Coordinates, QueryError> {
        self.store
            .restaurant_location(restaurant_id)
            .await?
            .ok_or(QueryError::NotFound(Missing::Restaurant))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use restaurant_safety_database::memory::MemoryStore;

    use super::*;
    use crate::test_support::{ORIGIN, crime, crime_rank, inspection, queries, restaurant};

    fn pizza_store(count: i64) -> MemoryStore {
        (1..=count).fold(MemoryStore::new(), |store, id| {
            store.with_restaurant(restaurant(id, &format!("Pizza Place {id:02}"), ORIGIN))
        })
    }

    #[tokio::test]
    async fn search_pages_and_counts() {
        let store = Arc::new(pizza_store(20).with_restaurant(restaurant(99, "Taco Bell", ORIGIN)));
        let page = queries(&store)
            .search("pizza", Pagination::new(1, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 10);
        assert_eq!(page.total_results, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 2);
        assert_eq!(store.call_count("count_restaurants"), 1);
    }

    #[tokio::test]
    async fn later_pages_use_offset() {
        let store = Arc::new(pizza_store(5));
        let page = queries(&store)
            .search("PIZZA", Pagination::new(2, 2).unwrap())
            .await
            .unwrap();

        // Names sort descending: 05, 04 | 03, 02 | 01
        let ids: Vec<i64> = page.items.iter().map(|r| r.restaurant_id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn empty_search_skips_count() {
        let store = Arc::new(pizza_store(3));
        let page = queries(&store)
            .search("sushi", Pagination::default())
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_results, 0);
        assert_eq!(store.call_count("count_restaurants"), 0);
    }

    #[tokio::test]
    async fn search_store_failure_is_fatal() {
        let store = Arc::new(pizza_store(3));
        store.set_failing(true);
        let err = queries(&store)
            .search("pizza", Pagination::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fatal);
    }

    #[tokio::test]
    async fn restaurant_info_not_found() {
        let store = Arc::new(pizza_store(1));
        let q = queries(&store);

        assert_eq!(q.restaurant_info(1).await.unwrap().restaurant_id, 1);
        assert!(matches!(
            q.restaurant_info(999).await,
            Err(QueryError::NotFound(Missing::Restaurant))
        ));
    }

    #[tokio::test]
    async fn inspections_filter_by_year() {
        let store = Arc::new(
            pizza_store(1)
                .with_inspection(inspection(1, 1, "2020-05-01", "Risk 1 (High)", "Pass"))
                .with_inspection(inspection(2, 1, "2021-05-01", "Risk 1 (High)", "Fail")),
        );
        let q = queries(&store);

        assert_eq!(q.inspections(1, None).await.unwrap().len(), 2);

        let only_2021 = q.inspections(1, Some(2021)).await.unwrap();
        assert_eq!(only_2021.len(), 1);
        assert_eq!(only_2021[0].inspection_id, 2);

        assert!(matches!(
            q.inspections(1, Some(2019)).await,
            Err(QueryError::NotFound(Missing::Inspections))
        ));
    }

    #[tokio::test]
    async fn crime_lookup_and_rank() {
        let store = Arc::new(
            MemoryStore::new()
                .with_crime(crime(1, "THEFT", "2021-01-01", false, "STREET", ORIGIN))
                .with_crime_rank(crime_rank("THEFT", false, "STREET", 5.0)),
        );
        let q = queries(&store);

        assert_eq!(q.crime(1).await.unwrap().len(), 1);
        assert!(matches!(
            q.crime(2).await,
            Err(QueryError::NotFound(Missing::Crime))
        ));

        let rank = q.crime_rank(1).await.unwrap();
        assert!((rank.danger_score - 5.0).abs() < f64::EPSILON);
        assert!(matches!(
            q.crime_rank(2).await,
            Err(QueryError::NotFound(Missing::CrimeRank))
        ));
    }
}
