#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the restaurant safety server.
//!
//! Field names are part of the wire contract shared with existing clients,
//! which mixes `snake_case` row columns (`restaurant_id`) with `camelCase`
//! computed values (`inspectionScore`). Each struct therefore names its
//! fields explicitly instead of relying on a blanket `rename_all`.

use chrono::NaiveDate;
use restaurant_safety_restaurant_models::{
    Crime, CrimeRank, Inspection, Restaurant, RestaurantInfo, RestaurantStub,
};
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /searchRestaurant`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Substring to look for in restaurant names.
    pub search_str: String,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Results per page.
    pub page_size: Option<u32>,
}

/// Query parameters for endpoints keyed by a single restaurant.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RestaurantIdParams {
    /// Restaurant id.
    #[serde(rename = "resID")]
    pub res_id: i64,
}

/// Query parameters for `GET /getDangerScore`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DangerScoreParams {
    /// Restaurant id.
    #[serde(rename = "resID")]
    pub res_id: i64,
    /// Radius in kilometres.
    pub distance: Option<f64>,
}

/// Query parameters for `GET /getCrimeNearRes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeNearParams {
    /// Restaurant id.
    #[serde(rename = "resID")]
    pub res_id: i64,
    /// Radius in kilometres.
    pub distance: f64,
    /// Exact crime type to keep.
    pub crime_type: Option<String>,
    /// Calendar year to keep.
    pub crime_year: Option<i32>,
}

/// Query parameters for `GET /getRestaurantInspection`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InspectionParams {
    /// Restaurant id.
    #[serde(rename = "resID")]
    pub res_id: i64,
    /// Calendar year to keep.
    pub year: Option<i32>,
}

/// Query parameters for `GET /getNearbyRestaurant`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParams {
    /// Reference restaurant id.
    #[serde(rename = "resID")]
    pub res_id: i64,
    /// Radius in kilometres.
    pub distance: f64,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Results per page.
    pub page_size: Option<u32>,
    /// `distance` or `overallScore`.
    pub sort_type: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
}

/// Query parameters for endpoints keyed by a single crime.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CrimeIdParams {
    /// Crime id.
    #[serde(rename = "crimeID")]
    pub crime_id: i64,
}

/// Paginated list of restaurants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRestaurantPage<T> {
    /// 1-based page number.
    pub page: u32,
    /// Maximum results per page.
    pub page_size: u32,
    /// Number of pages at this page size.
    pub total_pages: u64,
    /// Total matching restaurants across all pages.
    pub total_results: u64,
    /// Restaurants on this page.
    pub restaurants: Vec<T>,
}

/// A restaurant search hit.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRestaurantStub {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Restaurant name.
    pub restaurant_name: String,
}

impl From<RestaurantStub> for ApiRestaurantStub {
    fn from(row: RestaurantStub) -> Self {
        Self {
            restaurant_id: row.restaurant_id,
            restaurant_name: row.restaurant_name,
        }
    }
}

/// Identity fields of a restaurant.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRestaurantInfo {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Restaurant name.
    pub restaurant_name: String,
    /// Street address.
    pub restaurant_address: String,
}

impl From<RestaurantInfo> for ApiRestaurantInfo {
    fn from(info: RestaurantInfo) -> Self {
        Self {
            restaurant_id: info.restaurant_id,
            restaurant_name: info.restaurant_name,
            restaurant_address: info.restaurant_address,
        }
    }
}

/// Response of `GET /getInspectionScore`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiInspectionScore {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Mean inspection score.
    #[serde(rename = "inspectionScore")]
    pub inspection_score: f64,
}

/// Response of `GET /getSafetyScore`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiSafetyScore {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Mean danger score of nearby crimes.
    #[serde(rename = "safetyScore")]
    pub safety_score: f64,
}

/// Response of `GET /getDangerScore`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiDangerScore {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Mean danger score of crimes within the requested radius.
    #[serde(rename = "dangerScore")]
    pub danger_score: f64,
}

/// Response of `GET /getRestaurantOverallScore`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiOverallScore {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Equal-weighted mean of the inspection and safety scores.
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    /// Stored inspection score.
    #[serde(rename = "inspectionScore")]
    pub inspection_score: f64,
    /// Stored safety score.
    #[serde(rename = "safetyScore")]
    pub safety_score: f64,
}

/// Response of `GET /getRestaurantSummary`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRestaurantSummary {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Restaurant name.
    pub restaurant_name: String,
    /// Street address.
    pub restaurant_address: String,
    /// Equal-weighted mean of the inspection and safety scores.
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    /// Mean inspection score.
    #[serde(rename = "inspectionScore")]
    pub inspection_score: f64,
    /// Mean danger score of nearby crimes.
    #[serde(rename = "safetyScore")]
    pub safety_score: f64,
}

/// A crime near a restaurant.
#[derive(Debug, Clone, Serialize)]
pub struct ApiNearbyCrime {
    /// Crime id.
    pub crime_id: i64,
    /// Date the crime occurred.
    pub crime_date: NaiveDate,
    /// Primary crime type, e.g. `THEFT`.
    pub crime_type: String,
    /// Secondary description, if recorded.
    pub crime_description: Option<String>,
    /// Kilometres from the restaurant.
    pub distance: f64,
}

impl ApiNearbyCrime {
    /// Projects `crime` with its distance from the restaurant.
    #[must_use]
    pub fn new(crime: Crime, distance: f64) -> Self {
        Self {
            crime_id: crime.crime_id,
            crime_date: crime.crime_date,
            crime_type: crime.crime_type,
            crime_description: crime.crime_description,
            distance,
        }
    }
}

/// A raw inspection row.
#[derive(Debug, Clone, Serialize)]
pub struct ApiInspection {
    /// Inspection id.
    pub inspection_id: i64,
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Date of the inspection.
    pub inspection_date: NaiveDate,
    /// Inspection type, if recorded.
    pub inspection_type: Option<String>,
    /// Risk category assigned at inspection.
    pub risk_level: String,
    /// Outcome of the inspection.
    pub inspection_result: String,
}

impl From<Inspection> for ApiInspection {
    fn from(row: Inspection) -> Self {
        Self {
            inspection_id: row.inspection_id,
            restaurant_id: row.restaurant_id,
            inspection_date: row.inspection_date,
            inspection_type: row.inspection_type,
            risk_level: row.risk_level,
            inspection_result: row.inspection_result,
        }
    }
}

/// A raw crime row.
#[derive(Debug, Clone, Serialize)]
pub struct ApiCrime {
    /// Crime id.
    pub crime_id: i64,
    /// Date the crime occurred.
    pub crime_date: NaiveDate,
    /// Primary crime type, e.g. `THEFT`.
    pub crime_type: String,
    /// Secondary description, if recorded.
    pub crime_description: Option<String>,
    /// Whether an arrest was made.
    pub if_arrest: bool,
    /// Kind of place the crime occurred.
    pub location_description: String,
    /// Latitude in degrees.
    pub crime_latitude: f64,
    /// Longitude in degrees.
    pub crime_longitude: f64,
}

impl From<Crime> for ApiCrime {
    fn from(row: Crime) -> Self {
        Self {
            crime_id: row.crime_id,
            crime_date: row.crime_date,
            crime_type: row.crime_type,
            crime_description: row.crime_description,
            if_arrest: row.if_arrest,
            location_description: row.location_description,
            crime_latitude: row.location.latitude,
            crime_longitude: row.location.longitude,
        }
    }
}

/// Danger weighting of a crime.
#[derive(Debug, Clone, Serialize)]
pub struct ApiCrimeRank {
    /// Primary crime type, e.g. `THEFT`.
    pub crime_type: String,
    /// Whether an arrest was made.
    pub if_arrest: bool,
    /// Kind of place the crime occurred.
    pub location_description: String,
    /// Danger weighting of this type, arrest and location combination.
    pub danger_score: f64,
}

impl From<CrimeRank> for ApiCrimeRank {
    fn from(rank: CrimeRank) -> Self {
        Self {
            crime_type: rank.crime_type,
            if_arrest: rank.if_arrest,
            location_description: rank.location_description,
            danger_score: rank.danger_score,
        }
    }
}

/// A full restaurant row annotated for the nearby listing.
#[derive(Debug, Clone, Serialize)]
pub struct ApiNearbyRestaurant {
    /// Restaurant id.
    pub restaurant_id: i64,
    /// Restaurant name.
    pub restaurant_name: String,
    /// Street address.
    pub restaurant_address: String,
    /// Latitude in degrees.
    pub restaurant_latitude: f64,
    /// Longitude in degrees.
    pub restaurant_longitude: f64,
    /// Mean inspection score.
    #[serde(rename = "inspectionScore")]
    pub inspection_score: f64,
    /// Mean danger score of nearby crimes.
    #[serde(rename = "safetyScore")]
    pub safety_score: f64,
    /// Kilometres from the reference restaurant.
    pub distance: f64,
    /// Equal-weighted mean of the inspection and safety scores.
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
}

impl ApiNearbyRestaurant {
    /// Projects `restaurant` with its distance and overall score.
    #[must_use]
    pub fn new(restaurant: Restaurant, distance: f64, overall_score: f64) -> Self {
        Self {
            restaurant_id: restaurant.restaurant_id,
            restaurant_name: restaurant.restaurant_name,
            restaurant_address: restaurant.restaurant_address,
            restaurant_latitude: restaurant.location.latitude,
            restaurant_longitude: restaurant.location.longitude,
            inspection_score: restaurant.inspection_score,
            safety_score: restaurant.safety_score,
            distance,
            overall_score,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}

impl ApiError {
    /// Wraps `message` as an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use restaurant_safety_geo::Coordinates;
    use serde_json::json;

    use super::*;

    #[test]
    fn nearby_restaurant_uses_wire_names() {
        let restaurant = Restaurant {
            restaurant_id: 7,
            restaurant_name: "Au Cheval".to_string(),
            restaurant_address: "800 W Randolph St".to_string(),
            location: Coordinates::new(41.88, -87.64),
            inspection_score: 90.0,
            safety_score: 70.0,
        };

        let value = serde_json::to_value(ApiNearbyRestaurant::new(restaurant, 0.25, 80.0)).unwrap();

        assert_eq!(
            value,
            json!({
                "restaurant_id": 7,
                "restaurant_name": "Au Cheval",
                "restaurant_address": "800 W Randolph St",
                "restaurant_latitude": 41.88,
                "restaurant_longitude": -87.64,
                "inspectionScore": 90.0,
                "safetyScore": 70.0,
                "distance": 0.25,
                "overallScore": 80.0,
            })
        );
    }

    #[test]
    fn crime_dates_serialize_as_plain_dates() {
        let crime = Crime {
            crime_id: 3,
            crime_date: NaiveDate::from_ymd_opt(2021, 7, 4).unwrap(),
            crime_type: "THEFT".to_string(),
            crime_description: None,
            if_arrest: false,
            location_description: "STREET".to_string(),
            location: Coordinates::new(41.88, -87.64),
        };

        let value = serde_json::to_value(ApiNearbyCrime::new(crime, 0.1)).unwrap();

        assert_eq!(value["crime_date"], "2021-07-04");
        assert_eq!(value["crime_description"], serde_json::Value::Null);
    }

    #[test]
    fn page_envelope_is_camel_case() {
        let page = ApiRestaurantPage::<ApiRestaurantStub> {
            page: 1,
            page_size: 10,
            total_pages: 0,
            total_results: 0,
            restaurants: Vec::new(),
        };

        assert_eq!(
            serde_json::to_value(page).unwrap(),
            json!({
                "page": 1,
                "pageSize": 10,
                "totalPages": 0,
                "totalResults": 0,
                "restaurants": [],
            })
        );
    }

    #[test]
    fn params_read_wire_names() {
        let params: NearbyParams = serde_json::from_value(json!({
            "resID": 5,
            "distance": 1.5,
            "pageSize": 3,
            "sortType": "overallScore",
        }))
        .unwrap();

        assert_eq!(params.res_id, 5);
        assert_eq!(params.page, None);
        assert_eq!(params.page_size, Some(3));
        assert_eq!(params.sort_type.as_deref(), Some("overallScore"));
    }
}
