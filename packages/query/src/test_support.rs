use std::sync::Arc;

use chrono::NaiveDate;
use restaurant_safety_database::{RestaurantStore, memory::MemoryStore};
use restaurant_safety_geo::{Coordinates, EARTH_RADIUS_KM};
use restaurant_safety_restaurant_models::{
    Crime, CrimeRank, Inspection, InspectionScoreEntry, Restaurant,
};

use crate::RestaurantQueries;

/// Chicago Loop.
pub const ORIGIN: Coordinates = Coordinates::new(41.8781, -87.6298);

pub fn queries(store: &Arc<MemoryStore>) -> RestaurantQueries {
    RestaurantQueries::new(Arc::clone(store) as Arc<dyn RestaurantStore>)
}

/// The point `km` kilometres due north of `from`.
pub fn north_of(from: Coordinates, km: f64) -> Coordinates {
    Coordinates::new(from.latitude + (km / EARTH_RADIUS_KM).to_degrees(), from.longitude)
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn restaurant(id: i64, name: &str, location: Coordinates) -> Restaurant {
    scored_restaurant(id, name, location, 0.0, 0.0)
}

pub fn scored_restaurant(
    id: i64,
    name: &str,
    location: Coordinates,
    inspection_score: f64,
    safety_score: f64,
) -> Restaurant {
    Restaurant {
        restaurant_id: id,
        restaurant_name: name.to_string(),
        restaurant_address: format!("{id} W Madison St"),
        location,
        inspection_score,
        safety_score,
    }
}

pub fn inspection(
    id: i64,
    restaurant_id: i64,
    inspection_date: &str,
    risk_level: &str,
    inspection_result: &str,
) -> Inspection {
    Inspection {
        inspection_id: id,
        restaurant_id,
        inspection_date: date(inspection_date),
        inspection_type: Some("Canvass".to_string()),
        risk_level: risk_level.to_string(),
        inspection_result: inspection_result.to_string(),
    }
}

pub fn inspection_score(
    risk_level: &str,
    inspection_result: &str,
    score: f64,
) -> InspectionScoreEntry {
    InspectionScoreEntry {
        risk_level: risk_level.to_string(),
        inspection_result: inspection_result.to_string(),
        inspection_score: score,
    }
}

pub fn crime(
    id: i64,
    crime_type: &str,
    crime_date: &str,
    if_arrest: bool,
    location_description: &str,
    location: Coordinates,
) -> Crime {
    Crime {
        crime_id: id,
        crime_date: date(crime_date),
        crime_type: crime_type.to_string(),
        crime_description: Some("SIMPLE".to_string()),
        if_arrest,
        location_description: location_description.to_string(),
        location,
    }
}

pub fn crime_rank(
    crime_type: &str,
    if_arrest: bool,
    location_description: &str,
    score: f64,
) -> CrimeRank {
    CrimeRank {
        crime_type: crime_type.to_string(),
        if_arrest,
        location_description: location_description.to_string(),
        danger_score: score,
    }
}
