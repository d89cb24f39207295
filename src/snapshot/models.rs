use crate::shared::{geo::Coordinate, time::Time};
use chrono::NaiveDateTime;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct Stop {
    pub index: u32,
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub coordinate: Coordinate,
    pub embedding: Box<[f32]>,
}

#[derive(Debug, Default, Clone)]
pub struct StopTime {
    pub trip_id: Arc<str>,
    pub stop_idx: u32,
    pub stop_id: Arc<str>,
    pub sequence: u32,
    pub arrival_time: Time,
    pub departure_time: Time,
    pub headsign: Option<Arc<str>>,
}

#[derive(Debug, Clone)]
pub struct DelayRecord {
    pub operated_at: NaiveDateTime,
    pub trip_id: Arc<str>,
    pub corridor: Arc<str>,
    pub code: Arc<str>,
    /// None when the code has no entry in the reference table
    pub reason: Option<Arc<str>>,
}

/// A fully reconstructed itinerary for one trip.
#[derive(Debug, Clone)]
pub struct TripInfo {
    pub trip_id: Arc<str>,
    pub headsign: Arc<str>,
    pub origin: Arc<str>,
    pub destination: Arc<str>,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub stops: Vec<TripStop>,
}

#[derive(Debug, Clone)]
pub struct TripStop {
    pub sequence: u32,
    pub stop_name: Arc<str>,
    pub arrival_time: Time,
    pub departure_time: Time,
}

/// Endpoint summary of a single trip, as returned by next-trip search.
#[derive(Debug, Clone)]
pub struct TripSummary {
    pub trip_id: Arc<str>,
    pub origin: Arc<str>,
    pub destination: Arc<str>,
    pub departure_time: Time,
    pub arrival_time: Time,
}
