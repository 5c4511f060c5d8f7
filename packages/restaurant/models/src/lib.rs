#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row types for restaurants, inspections, and crimes.
//!
//! These types represent data as read from the restaurant safety store.
//! They are distinct from the API response types in
//! `restaurant_safety_server_models` so the wire contract can evolve
//! independently of the storage layout.

use chrono::{Datelike as _, NaiveDate};
use restaurant_safety_geo::Coordinates;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Minimal restaurant identity returned by name searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantStub {
    /// Primary key.
    pub restaurant_id: i64,
    /// Display name.
    pub restaurant_name: String,
}

/// Basic identity fields of a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantInfo {
    /// Primary key.
    pub restaurant_id: i64,
    /// Display name.
    pub restaurant_name: String,
    /// Street address.
    pub restaurant_address: String,
}

/// Pre-computed scores materialized on the restaurant row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredScores {
    /// Mean inspection score.
    pub inspection_score: f64,
    /// Mean danger score of nearby crimes.
    pub safety_score: f64,
}

/// A full restaurant row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Primary key.
    pub restaurant_id: i64,
    /// Display name.
    pub restaurant_name: String,
    /// Street address.
    pub restaurant_address: String,
    /// Location of the restaurant.
    pub location: Coordinates,
    /// Stored inspection score.
    pub inspection_score: f64,
    /// Stored safety score.
    pub safety_score: f64,
}

impl Restaurant {
    /// Identity fields of this restaurant.
    #[must_use]
    pub fn info(&self) -> RestaurantInfo {
        RestaurantInfo {
            restaurant_id: self.restaurant_id,
            restaurant_name: self.restaurant_name.clone(),
            restaurant_address: self.restaurant_address.clone(),
        }
    }

    /// Stored scores of this restaurant.
    #[must_use]
    pub const fn scores(&self) -> StoredScores {
        StoredScores {
            inspection_score: self.inspection_score,
            safety_score: self.safety_score,
        }
    }
}

/// A single health inspection of a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    /// Primary key.
    pub inspection_id: i64,
    /// Inspected restaurant.
    pub restaurant_id: i64,
    /// Date of the inspection.
    pub inspection_date: NaiveDate,
    /// Inspection type (canvass, complaint, license, ...).
    pub inspection_type: Option<String>,
    /// Risk level assigned to the establishment.
    pub risk_level: String,
    /// Categorical outcome (pass, pass w/ conditions, fail, ...).
    pub inspection_result: String,
}

/// One row of the inspection score table keyed by
/// `(risk_level, inspection_result)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionScoreEntry {
    /// Risk level key.
    pub risk_level: String,
    /// Inspection result key.
    pub inspection_result: String,
    /// Numeric score for this combination.
    pub inspection_score: f64,
}

/// A reported crime incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crime {
    /// Primary key.
    pub crime_id: i64,
    /// Date the crime occurred.
    pub crime_date: NaiveDate,
    /// Primary crime type (`THEFT`, `BATTERY`, ...).
    pub crime_type: String,
    /// Free-text description.
    pub crime_description: Option<String>,
    /// Whether an arrest was made.
    pub if_arrest: bool,
    /// Location description (street, restaurant, residence, ...).
    pub location_description: String,
    /// Location of the incident.
    pub location: Coordinates,
}

/// Danger weighting for a `(crime_type, if_arrest, location_description)`
/// combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeRank {
    /// Crime type key.
    pub crime_type: String,
    /// Arrest flag key.
    pub if_arrest: bool,
    /// Location description key.
    pub location_description: String,
    /// Severity weight.
    pub danger_score: f64,
}

/// Optional filters for crime proximity queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeFilter {
    /// Exact crime type match.
    pub crime_type: Option<String>,
    /// Calendar year of `crime_date`.
    pub year: Option<i32>,
}

impl CrimeFilter {
    /// Whether `crime` passes every filter that is set.
    #[must_use]
    pub fn matches(&self, crime: &Crime) -> bool {
        self.crime_type
            .as_deref()
            .is_none_or(|t| crime.crime_type == t)
            && self.year.is_none_or(|y| crime.crime_date.year() == y)
    }
}

/// Key used to order nearby restaurants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum SortType {
    /// Distance from the reference restaurant.
    #[serde(rename = "distance")]
    #[strum(to_string = "distance")]
    Distance,
    /// Equal-weighted inspection and safety score.
    #[serde(rename = "overallScore", alias = "overallRanking")]
    #[strum(to_string = "overallScore", serialize = "overallRanking")]
    OverallScore,
}

/// Direction of a sort.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crime(crime_type: &str, date: &str) -> Crime {
        Crime {
            crime_id: 1,
            crime_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            crime_type: crime_type.to_string(),
            crime_description: None,
            if_arrest: false,
            location_description: "STREET".to_string(),
            location: Coordinates::new(41.0, -87.0),
        }
    }

    #[test]
    fn sort_type_parses_names_and_alias() {
        assert_eq!("distance".parse::<SortType>().unwrap(), SortType::Distance);
        assert_eq!(
            "overallScore".parse::<SortType>().unwrap(),
            SortType::OverallScore
        );
        assert_eq!(
            "overallRanking".parse::<SortType>().unwrap(),
            SortType::OverallScore
        );
        assert!("rating".parse::<SortType>().is_err());
        assert_eq!(SortType::OverallScore.to_string(), "overallScore");
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(CrimeFilter::default().matches(&crime("THEFT", "2021-01-01")));
    }

    #[test]
    fn filter_checks_type_and_year() {
        let filter = CrimeFilter {
            crime_type: Some("BURGLARY".to_string()),
            year: Some(2021),
        };
        assert!(filter.matches(&crime("BURGLARY", "2021-06-30")));
        assert!(!filter.matches(&crime("BURGLARY", "2020-06-30")));
        assert!(!filter.matches(&crime("THEFT", "2021-06-30")));
    }
}
