//! Spherical-earth geodesy used for edge costs, the search heuristic and the
//! path cleaner.
//!
//! Distances are great-circle distances in nautical miles. The same function
//! provides both the A* edge cost and its heuristic, which keeps the heuristic
//! admissible and consistent (the triangle inequality holds on the sphere).

use serde::{Deserialize, Serialize};

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Metres per nautical mile.
pub const METERS_PER_NM: f64 = 1852.0;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPos {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in nautical miles (haversine).
    pub fn distance_nm(&self, other: &GeoPos) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_NM * c
    }

    /// Great-circle distance in metres.
    pub fn distance_m(&self, other: &GeoPos) -> f64 {
        self.distance_nm(other) * METERS_PER_NM
    }

    /// Initial true course towards `other`, in degrees `[0, 360)`.
    pub fn course_deg(&self, other: &GeoPos) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let x = delta_lon.sin() * lat2.cos();
        let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

        normalize_course(x.atan2(y).to_degrees())
    }

    /// Position reached by travelling `distance_nm` along the great circle
    /// leaving on `course_deg`.
    pub fn offset(&self, course_deg: f64, distance_nm: f64) -> GeoPos {
        let angular = distance_nm / EARTH_RADIUS_NM;
        let course = course_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * course.cos()).asin();
        let lon2 = lon1
            + (course.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        GeoPos {
            lat: lat2.to_degrees(),
            lon: normalize_longitude(lon2.to_degrees()),
        }
    }

    /// Earth-centred cartesian coordinates on a sphere of radius
    /// [`EARTH_RADIUS_NM`], used as KD-tree keys.
    pub fn to_cartesian(&self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        [
            EARTH_RADIUS_NM * lat.cos() * lon.cos(),
            EARTH_RADIUS_NM * lat.cos() * lon.sin(),
            EARTH_RADIUS_NM * lat.sin(),
        ]
    }
}

/// Straight-line (chord) length subtending a great-circle arc of `arc_nm`.
pub fn chord_for_arc_nm(arc_nm: f64) -> f64 {
    let half_angle = (arc_nm / (2.0 * EARTH_RADIUS_NM)).min(std::f64::consts::FRAC_PI_2);
    2.0 * EARTH_RADIUS_NM * half_angle.sin()
}

/// Absolute difference between two courses, folded into `[0, 180]`.
pub fn course_deviation_deg(a: f64, b: f64) -> f64 {
    let diff = (normalize_course(a) - normalize_course(b)).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

fn normalize_course(deg: f64) -> f64 {
    let c = deg.rem_euclid(360.0);
    if c >= 360.0 {
        0.0
    } else {
        c
    }
}

fn normalize_longitude(deg: f64) -> f64 {
    (deg + 540.0).rem_euclid(360.0) - 180.0
}
