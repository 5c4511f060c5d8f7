#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only data access for the restaurant safety store.
//!
//! Every query function in the rest of the system talks to the store
//! through the [`RestaurantStore`] trait, which is injected at
//! construction time. [`SqlRestaurantStore`] implements it over a
//! `switchy_database` connection to the `SQLite` database produced by the
//! ingestion pipeline. The store only applies coarse bounding-box filters;
//! exact Haversine distances are computed by the caller.

pub mod db;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod queries;

use async_trait::async_trait;
use restaurant_safety_geo::{BoundingBox, Coordinates};
use restaurant_safety_restaurant_models::{
    Crime, CrimeFilter, CrimeRank, Inspection, InspectionScoreEntry, Restaurant, RestaurantInfo,
    RestaurantStub, StoredScores,
};

pub use queries::SqlRestaurantStore;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database could not be opened.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Read-only access to restaurants, inspections, and crimes.
///
/// Implementations must be cheap to share between concurrent requests;
/// every method is a single independent read.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// Restaurants whose name contains `search` (case-insensitive), ordered
    /// by name descending then id ascending.
    async fn search_restaurants(
        &self,
        search: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RestaurantStub>, DbError>;

    /// Number of restaurants whose name contains `search`.
    async fn count_restaurants(&self, search: &str) -> Result<u64, DbError>;

    /// Identity fields of one restaurant.
    async fn restaurant_info(&self, restaurant_id: i64)
    -> Result<Option<RestaurantInfo>, DbError>;

    /// Materialized scores of one restaurant.
    async fn restaurant_scores(&self, restaurant_id: i64)
    -> Result<Option<StoredScores>, DbError>;

    /// Coordinates of one restaurant.
    async fn restaurant_location(&self, restaurant_id: i64)
    -> Result<Option<Coordinates>, DbError>;

    /// Every restaurant other than `exclude_id` inside `bbox`.
    async fn restaurants_in_bbox(
        &self,
        bbox: &BoundingBox,
        exclude_id: i64,
    ) -> Result<Vec<Restaurant>, DbError>;

    /// Inspections of one restaurant, optionally limited to a calendar year.
    async fn inspections(
        &self,
        restaurant_id: i64,
        year: Option<i32>,
    ) -> Result<Vec<Inspection>, DbError>;

    /// The full `(risk_level, inspection_result)` score table.
    async fn inspection_score_table(&self) -> Result<Vec<InspectionScoreEntry>, DbError>;

    /// Crimes inside `bbox` that pass `filter`.
    async fn crimes_in_bbox(
        &self,
        bbox: &BoundingBox,
        filter: &CrimeFilter,
    ) -> Result<Vec<Crime>, DbError>;

    /// Raw rows for one crime id.
    async fn crime(&self, crime_id: i64) -> Result<Vec<Crime>, DbError>;

    /// The full crime rank table.
    async fn crime_ranks(&self) -> Result<Vec<CrimeRank>, DbError>;

    /// The crime rank row matching one crime's
    /// `(crime_type, if_arrest, location_description)`.
    async fn crime_rank_for_crime(&self, crime_id: i64) -> Result<Option<CrimeRank>, DbError>;
}
