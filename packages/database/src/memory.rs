//! In-memory [`RestaurantStore`] for tests and fixtures.
//!
//! Mirrors the semantics of [`crate::SqlRestaurantStore`] over plain
//! vectors, records how often each method was called, and can be switched
//! into a failing mode to exercise error paths.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Datelike as _;
use restaurant_safety_geo::{BoundingBox, Coordinates};
use restaurant_safety_restaurant_models::{
    Crime, CrimeFilter, CrimeRank, Inspection, InspectionScoreEntry, Restaurant, RestaurantInfo,
    RestaurantStub, StoredScores,
};

use crate::{DbError, RestaurantStore};

/// A [`RestaurantStore`] holding all rows in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    restaurants: Vec<Restaurant>,
    inspections: Vec<Inspection>,
    inspection_scores: Vec<InspectionScoreEntry>,
    crimes: Vec<Crime>,
    crime_ranks: Vec<CrimeRank>,
    failing: AtomicBool,
    calls: Mutex<BTreeMap<&'static str, usize>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a restaurant.
    #[must_use]
    pub fn with_restaurant(mut self, restaurant: Restaurant) -> Self {
        self.restaurants.push(restaurant);
        self
    }

    /// Adds an inspection.
    #[must_use]
    pub fn with_inspection(mut self, inspection: Inspection) -> Self {
        self.inspections.push(inspection);
        self
    }

    /// Adds an inspection score table row.
    #[must_use]
    pub fn with_inspection_score(mut self, entry: InspectionScoreEntry) -> Self {
        self.inspection_scores.push(entry);
        self
    }

    /// Adds a crime.
    #[must_use]
    pub fn with_crime(mut self, crime: Crime) -> Self {
        self.crimes.push(crime);
        self
    }

    /// Adds a crime rank row.
    #[must_use]
    pub fn with_crime_rank(mut self, rank: CrimeRank) -> Self {
        self.crime_ranks.push(rank);
        self
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times `method` has been called.
    ///
    /// # Panics
    ///
    /// Panics if the call counter mutex is poisoned.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("call counter poisoned")
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of calls across all methods.
    ///
    /// # Panics
    ///
    /// Panics if the call counter mutex is poisoned.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .expect("call counter poisoned")
            .values()
            .sum()
    }

    fn record(&self, method: &'static str) -> Result<(), DbError> {
        *self
            .calls
            .lock()
            .expect("call counter poisoned")
            .entry(method)
            .or_insert(0) += 1;

        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Connection {
                message: format!("{method}: store unavailable"),
            });
        }

        Ok(())
    }

    fn find(&self, restaurant_id: i64) -> Option<&Restaurant> {
        self.restaurants
            .iter()
            .find(|r| r.restaurant_id == restaurant_id)
    }

    fn name_matches(&self, search: &str) -> Vec<&Restaurant> {
        let needle = search.to_lowercase();
        self.restaurants
            .iter()
            .filter(|r| r.restaurant_name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    async fn search_restaurants(
        &self,
        search: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RestaurantStub>, DbError> {
        self.record("search_restaurants")?;

        let mut matches = self.name_matches(search);
        matches.sort_by(|a, b| {
            b.restaurant_name
                .cmp(&a.restaurant_name)
                .then(a.restaurant_id.cmp(&b.restaurant_id))
        });

        Ok(matches
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| RestaurantStub {
                restaurant_id: r.restaurant_id,
                restaurant_name: r.restaurant_name.clone(),
            })
            .collect())
    }

    async fn count_restaurants(&self, search: &str) -> Result<u64, DbError> {
        self.record("count_restaurants")?;
        Ok(self.name_matches(search).len() as u64)
    }

    async fn restaurant_info(
        &self,
        restaurant_id: i64,
    ) -> Result<Option<RestaurantInfo>, DbError> {
        self.record("restaurant_info")?;
        Ok(self.find(restaurant_id).map(Restaurant::info))
    }

    async fn restaurant_scores(
        &self,
        restaurant_id: i64,
    ) -> Result<Option<StoredScores>, DbError> {
        self.record("restaurant_scores")?;
        Ok(self.find(restaurant_id).map(Restaurant::scores))
    }

    async fn restaurant_location(
        &self,
        restaurant_id: i64,
    ) -> Result<Option<Coordinates>, DbError> {
        self.record("restaurant_location")?;

        match self.find(restaurant_id) {
            None => Ok(None),
            Some(r) if r.location.is_valid() => Ok(Some(r.location)),
            Some(_) => Err(DbError::Conversion {
                message: format!("Restaurant {restaurant_id} has invalid coordinates"),
            }),
        }
    }

    async fn restaurants_in_bbox(
        &self,
        bbox: &BoundingBox,
        exclude_id: i64,
    ) -> Result<Vec<Restaurant>, DbError> {
        self.record("restaurants_in_bbox")?;
        Ok(self
            .restaurants
            .iter()
            .filter(|r| r.restaurant_id != exclude_id && bbox.contains(&r.location))
            .cloned()
            .collect())
    }

    async fn inspections(
        &self,
        restaurant_id: i64,
        year: Option<i32>,
    ) -> Result<Vec<Inspection>, DbError> {
        self.record("inspections")?;

        let mut inspections: Vec<Inspection> = self
            .inspections
            .iter()
            .filter(|i| i.restaurant_id == restaurant_id)
            .filter(|i| year.is_none_or(|y| i.inspection_date.year() == y))
            .cloned()
            .collect();
        inspections.sort_by(|a, b| {
            b.inspection_date
                .cmp(&a.inspection_date)
                .then(a.inspection_id.cmp(&b.inspection_id))
        });

        Ok(inspections)
    }

    async fn inspection_score_table(&self) -> Result<Vec<InspectionScoreEntry>, DbError> {
        self.record("inspection_score_table")?;
        Ok(self.inspection_scores.clone())
    }

    async fn crimes_in_bbox(
        &self,
        bbox: &BoundingBox,
        filter: &CrimeFilter,
    ) -> Result<Vec<Crime>, DbError> {
        self.record("crimes_in_bbox")?;
        Ok(self
            .crimes
            .iter()
            .filter(|c| bbox.contains(&c.location) && filter.matches(c))
            .cloned()
            .collect())
    }

    async fn crime(&self, crime_id: i64) -> Result<Vec<Crime>, DbError> {
        self.record("crime")?;
        Ok(self
            .crimes
            .iter()
            .filter(|c| c.crime_id == crime_id)
            .cloned()
            .collect())
    }

    async fn crime_ranks(&self) -> Result<Vec<CrimeRank>, DbError> {
        self.record("crime_ranks")?;
        Ok(self.crime_ranks.clone())
    }

    async fn crime_rank_for_crime(&self, crime_id: i64) -> Result<Option<CrimeRank>, DbError> {
        self.record("crime_rank_for_crime")?;

        let Some(crime) = self.crimes.iter().find(|c| c.crime_id == crime_id) else {
            return Ok(None);
        };

        Ok(self
            .crime_ranks
            .iter()
            .find(|r| {
                r.crime_type == crime.crime_type
                    && r.if_arrest == crime.if_arrest
                    && r.location_description == crime.location_description
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn restaurant(id: i64, name: &str) -> Restaurant {
        Restaurant {
            restaurant_id: id,
            restaurant_name: name.to_string(),
            restaurant_address: String::new(),
            location: Coordinates::new(41.88, -87.63),
            inspection_score: 0.0,
            safety_score: 0.0,
        }
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_ordered() {
        let store = MemoryStore::new()
            .with_restaurant(restaurant(1, "Pizza Hut"))
            .with_restaurant(restaurant(2, "Lou Malnati's Pizzeria"))
            .with_restaurant(restaurant(3, "Taco Bell"));

        let found = store.search_restaurants("PIZZA", 10, 0).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|r| r.restaurant_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.count_restaurants("pizza").await.unwrap(), 2);
        assert_eq!(store.call_count("search_restaurants"), 1);
        assert_eq!(store.total_calls(), 2);
    }

    #[tokio::test]
    async fn crime_rank_joins_on_full_key() {
        let store = MemoryStore::new()
            .with_crime(Crime {
                crime_id: 7,
                crime_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                crime_type: "THEFT".to_string(),
                crime_description: None,
                if_arrest: true,
                location_description: "STREET".to_string(),
                location: Coordinates::new(41.88, -87.63),
            })
            .with_crime_rank(CrimeRank {
                crime_type: "THEFT".to_string(),
                if_arrest: false,
                location_description: "STREET".to_string(),
                danger_score: 3.0,
            });

        assert!(store.crime_rank_for_crime(7).await.unwrap().is_none());
        assert!(store.crime_rank_for_crime(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_location_is_a_conversion_error() {
        let mut unplaced = restaurant(2, "Nowhere Grill");
        unplaced.location = Coordinates::new(f64::NAN, -87.63);
        let store = MemoryStore::new()
            .with_restaurant(restaurant(1, "Pizza Hut"))
            .with_restaurant(unplaced);

        assert!(store.restaurant_location(1).await.unwrap().is_some());
        assert!(store.restaurant_location(3).await.unwrap().is_none());
        assert!(matches!(
            store.restaurant_location(2).await,
            Err(DbError::Conversion { .. })
        ));
    }

    #[tokio::test]
    async fn failing_mode_errors_every_call() {
        let store = MemoryStore::new().with_restaurant(restaurant(1, "Pizza Hut"));
        store.set_failing(true);
        assert!(store.restaurant_info(1).await.is_err());
        store.set_failing(false);
        assert!(store.restaurant_info(1).await.unwrap().is_some());
    }
}
