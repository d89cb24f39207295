use serde::{Deserialize, Serialize};
use std::{cmp, fmt::Display};

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from(value: (f64, f64)) -> Self {
        Self {
            latitude: value.0,
            longitude: value.1,
        }
    }
}

impl Coordinate {
    /// Great-circle distance to another coordinate, law of haversines on a
    /// 6371 km sphere. Inputs are degrees.
    pub fn distance(&self, coord: &Self) -> Distance {
        const R: f64 = 6371.0;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::powi(f64::sin(dist_lon / 2.0), 2);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(R * c)
    }
}

#[test]
fn distance_is_symmetric() {
    let union = Coordinate::from((43.6453, -79.3806));
    let oakville = Coordinate::from((43.4467, -79.6653));
    let there = union.distance(&oakville).as_meters();
    let back = oakville.distance(&union).as_meters();
    assert!((there - back).abs() < 1e-9);
}

#[test]
fn distance_to_self_is_zero() {
    let union = Coordinate::from((43.6453, -79.3806));
    assert!(union.distance(&union).as_meters() < 1e-9);
}

#[test]
fn distance_union_to_oakville() {
    let union = Coordinate::from((43.6453, -79.3806));
    let oakville = Coordinate::from((43.4467, -79.6653));
    let km = union.distance(&oakville).as_kilometers();
    assert!(km > 28.0 && km < 36.0, "got {km} km");
}

#[test]
fn distance_cmp() {
    let near = Distance::from_meters(500.0);
    let far = Distance::from_kilometers(1.0);
    assert!(near < far);
    assert_eq!(far, Distance::from_meters(1000.0));
}
