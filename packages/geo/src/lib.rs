#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance and radius pre-filters.
//!
//! [`distance_km`] is the single source of truth for "how far apart are
//! two points" across the query layer. It is used both as a filter
//! predicate ([`within_radius`]) and as a sortable derived column.
//! [`BoundingBox::around`] produces a cheap rectangular pre-filter that the
//! data store can evaluate with plain column comparisons before the exact
//! Haversine check runs.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Padding (in degrees) added to every bounding box edge so that points
/// sitting exactly on the circle survive floating-point rounding.
const BBOX_PADDING_DEG: f64 = 1e-9;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, `-90..=90`.
    pub latitude: f64,
    /// Longitude, `-180..=180`.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in kilometers.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Great-circle distance between two points in kilometers (Haversine).
///
/// Always `>= 0` for finite input, symmetric in its arguments, and exactly
/// `0.0` for identical coordinates.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Whether `point` lies strictly closer than `radius_km` to `center`.
#[must_use]
pub fn within_radius(center: &Coordinates, point: &Coordinates, radius_km: f64) -> bool {
    center.distance_to(point) < radius_km
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest latitude/longitude rectangle containing every point within
    /// `radius_km` of `center`.
    ///
    /// The box is a superset of the circle: callers still need
    /// [`within_radius`] for the exact predicate. When the circle touches a
    /// pole or crosses the antimeridian the longitude span widens to the
    /// full `-180..=180` range.
    #[must_use]
    pub fn around(center: &Coordinates, radius_km: f64) -> Self {
        let angular = radius_km.max(0.0) / EARTH_RADIUS_KM;
        let lat_delta = angular.to_degrees() + BBOX_PADDING_DEG;

        let south = (center.latitude - lat_delta).max(-90.0);
        let north = (center.latitude + lat_delta).min(90.0);

        let full_longitude = Self::new(-180.0, south, 180.0, north);

        if south <= -90.0 || north >= 90.0 {
            return full_longitude;
        }

        let ratio = angular.sin() / center.latitude.to_radians().cos();
        if !ratio.is_finite() || ratio >= 1.0 {
            return full_longitude;
        }

        let lon_delta = ratio.asin().to_degrees() + BBOX_PADDING_DEG;
        let west = center.longitude - lon_delta;
        let east = center.longitude + lon_delta;

        if west < -180.0 || east > 180.0 {
            return full_longitude;
        }

        Self::new(west, south, east, north)
    }

    /// Whether `point` falls inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Point reached by travelling `distance` km from `start` on `bearing_deg`.
    fn destination(start: &Coordinates, bearing_deg: f64, distance: f64) -> Coordinates {
        let delta = distance / EARTH_RADIUS_KM;
        let theta = bearing_deg.to_radians();
        let phi1 = start.latitude.to_radians();
        let lambda1 = start.longitude.to_radians();

        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos())
                .atan2(delta.cos() - phi1.sin() * phi2.sin());

        Coordinates::new(phi2.to_degrees(), lambda2.to_degrees())
    }

    #[test]
    fn identical_points_are_zero_apart() {
        assert!(distance_km(41.8781, -87.6298, 41.8781, -87.6298).abs() < f64::EPSILON);
        assert!(distance_km(0.0, 0.0, 0.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((41.8781, -87.6298), (41.9742, -87.9073)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
            ((89.9, 10.0), (-89.9, -170.0)),
        ];

        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let forward = distance_km(lat1, lon1, lat2, lon2);
            let backward = distance_km(lat2, lon2, lat1, lon1);
            assert!((forward - backward).abs() < EPS, "{forward} != {backward}");
            assert!(forward >= 0.0);
        }
    }

    #[test]
    fn pure_latitude_offset_matches_arc_length() {
        let offset_deg = (0.3 / EARTH_RADIUS_KM).to_degrees();
        let d = distance_km(41.0, -87.0, 41.0 + offset_deg, -87.0);
        assert!((d - 0.3).abs() < EPS, "got {d}");
    }

    #[test]
    fn chicago_loop_to_ohare() {
        // Roughly 26 km as the crow flies.
        let d = distance_km(41.8781, -87.6298, 41.9742, -87.9073);
        assert!(d > 24.0 && d < 28.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn within_radius_is_strict() {
        let center = Coordinates::new(41.0, -87.0);
        let offset_deg = (1.0 / EARTH_RADIUS_KM).to_degrees();
        let inside = Coordinates::new(41.0 + offset_deg * 0.5, -87.0);
        let outside = Coordinates::new(41.0 + offset_deg * 2.0, -87.0);

        assert!(within_radius(&center, &inside, 1.0));
        assert!(!within_radius(&center, &outside, 1.0));
        assert!(!within_radius(&center, &center, 0.0));
    }

    #[test]
    fn bounding_box_covers_circle() {
        let centers = [
            Coordinates::new(41.8781, -87.6298),
            Coordinates::new(-33.8688, 151.2093),
            Coordinates::new(70.0, 25.0),
            Coordinates::new(0.0, 0.0),
        ];

        for center in centers {
            for radius in [0.1, 0.5, 5.0, 250.0] {
                let bbox = BoundingBox::around(&center, radius);
                for step in 0..72 {
                    let bearing = f64::from(step) * 5.0;
                    let edge = destination(&center, bearing, radius * 0.999_999);
                    assert!(
                        bbox.contains(&edge),
                        "{edge:?} at bearing {bearing} escaped {bbox:?} (radius {radius})"
                    );
                }
            }
        }
    }

    #[test]
    fn bounding_box_widens_near_pole_and_antimeridian() {
        let polar = BoundingBox::around(&Coordinates::new(89.999, 0.0), 5.0);
        assert!((polar.west + 180.0).abs() < EPS);
        assert!((polar.east - 180.0).abs() < EPS);

        let dateline = BoundingBox::around(&Coordinates::new(0.0, 179.99), 5.0);
        assert!((dateline.west + 180.0).abs() < EPS);
        assert!((dateline.east - 180.0).abs() < EPS);
    }

    #[test]
    fn bounding_box_excludes_far_points() {
        let center = Coordinates::new(41.8781, -87.6298);
        let bbox = BoundingBox::around(&center, 1.0);
        assert!(!bbox.contains(&Coordinates::new(41.9742, -87.9073)));
    }

    #[test]
    fn validates_coordinate_ranges() {
        assert!(Coordinates::new(41.0, -87.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
