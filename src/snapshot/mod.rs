use crate::{
    feed,
    resolver::{Embedder, StopResolver},
    shared::time::Time,
};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

mod models;
mod source;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Feed error: {0}")]
    Feed(#[from] feed::Error),
    #[error("Calendar service id {value:?} is not a service date")]
    MalformedServiceDate { value: String },
    #[error("Malformed time {value:?} on trip {trip_id}")]
    MalformedTime { value: String, trip_id: String },
    #[error("Malformed embedding for stop {stop_id}: {reason}")]
    MalformedEmbedding { stop_id: String, reason: String },
    #[error("Malformed timestamp {value:?} in delay log")]
    MalformedTimestamp { value: String },
    #[error("Stop time on trip {trip_id} references unknown stop {stop_id}")]
    UnknownStop { trip_id: String, stop_id: String },
    #[error("No trips serve corridor {corridor} between {start} and {end}")]
    EmptyWindow {
        corridor: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

#[derive(Error, Debug)]
pub enum TripError {
    #[error("Trip {trip_id} not found")]
    NotFound { trip_id: String },
    #[error("Trip {trip_id} has no headsign on its first stop")]
    MissingHeadsign { trip_id: String },
    #[error("No upcoming trip from {from} to {to}")]
    NoUpcomingTrip { from: String, to: String },
}

#[derive(Error, Debug)]
#[error("The delay log snapshot is empty")]
pub struct EmptyDelayLog;

/// The service-date range and corridor a snapshot is scoped to.
/// Trips belong to the corridor when their route id ends with the code.
#[derive(Debug, Clone)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub corridor: String,
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// An immutable in-memory snapshot of one corridor's schedule and delay
/// history. Built once with [`Snapshot::load_schedule`] and
/// [`Snapshot::load_delay_logs`], read-only afterwards, so it can be
/// shared across threads without locking.
#[derive(Debug)]
pub struct Snapshot {
    window: Window,
    stops: Box<[Stop]>,
    stop_lookup: HashMap<Arc<str>, usize>,
    stop_times: Box<[StopTime]>,
    trip_to_stop_times: HashMap<Arc<str>, Box<[usize]>>,
    delay_logs: Box<[DelayRecord]>,
}

impl Snapshot {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            stops: Default::default(),
            stop_lookup: Default::default(),
            stop_times: Default::default(),
            trip_to_stop_times: Default::default(),
            delay_logs: Default::default(),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn delay_logs(&self) -> &[DelayRecord] {
        &self.delay_logs
    }

    /// Get a stop with the given id.
    /// If no stop is found with the given id None is returned.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let stop_index = self.stop_lookup.get(id)?;
        Some(&self.stops[*stop_index])
    }

    /// Returns all the stop times for a given trip, ordered by sequence.
    /// If no trip was found with the given id None is returned.
    pub fn stop_times_by_trip_id(&self, trip_id: &str) -> Option<Vec<&StopTime>> {
        let stop_times = self.trip_to_stop_times.get(trip_id)?;
        Some(stop_times.iter().map(|i| &self.stop_times[*i]).collect())
    }

    /// All trip ids stored in the snapshot, in no particular order.
    pub fn trip_ids(&self) -> impl Iterator<Item = &str> {
        self.trip_to_stop_times.keys().map(|id| id.as_ref())
    }

    /// Stop resolution borrows the snapshot and the embedding model, so
    /// one snapshot can serve resolvers for different models.
    pub fn resolver<'a, E: Embedder>(&'a self, embedder: &'a E) -> StopResolver<'a, E> {
        StopResolver::new(self, embedder)
    }

    /// Rebuilds the full itinerary of one trip from its composite key
    /// `{date}-{corridor}-{number}`.
    pub fn trip_info(
        &self,
        trip_number: &str,
        service_date: NaiveDate,
        corridor: &str,
    ) -> Result<TripInfo, TripError> {
        let trip_id = format!(
            "{}-{}-{}",
            service_date.format("%Y%m%d"),
            corridor,
            trip_number
        );
        let indexes =
            self.trip_to_stop_times
                .get(trip_id.as_str())
                .ok_or_else(|| TripError::NotFound {
                    trip_id: trip_id.clone(),
                })?;

        // One representative row per sequence value. Rows were sorted
        // stably by sequence at load, so when an upstream join fanned a
        // sequence out into duplicates the first row in table order wins.
        let mut rows: Vec<&StopTime> = Vec::with_capacity(indexes.len());
        for index in indexes.iter() {
            let row = &self.stop_times[*index];
            if rows.last().is_none_or(|prev| prev.sequence != row.sequence) {
                rows.push(row);
            }
        }

        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return Err(TripError::NotFound { trip_id });
        };
        let headsign = first
            .headsign
            .clone()
            .ok_or_else(|| TripError::MissingHeadsign {
                trip_id: trip_id.clone(),
            })?;

        let origin = self.stops[first.stop_idx as usize].name.clone();
        let destination = self.stops[last.stop_idx as usize].name.clone();
        let departure_time = first.departure_time;
        let arrival_time = last.arrival_time;

        let stops = rows
            .into_iter()
            .map(|row| TripStop {
                sequence: row.sequence,
                stop_name: self.stops[row.stop_idx as usize].name.clone(),
                arrival_time: row.arrival_time,
                departure_time: row.departure_time,
            })
            .collect();

        Ok(TripInfo {
            trip_id: trip_id.into(),
            headsign,
            origin,
            destination,
            departure_time,
            arrival_time,
            stops,
        })
    }

    /// Finds the trip with the earliest departure from `origin_id` at or
    /// after `after` that later serves `destination_id`.
    pub fn next_trip(
        &self,
        origin_id: &str,
        destination_id: &str,
        after: Time,
    ) -> Result<TripSummary, TripError> {
        let mut best: Option<TripSummary> = None;
        for (trip_id, indexes) in &self.trip_to_stop_times {
            let rows: Vec<&StopTime> = indexes.iter().map(|i| &self.stop_times[*i]).collect();
            let Some(origin) = rows.iter().find(|row| row.stop_id.as_ref() == origin_id) else {
                continue;
            };
            let Some(destination) = rows
                .iter()
                .find(|row| row.sequence > origin.sequence && row.stop_id.as_ref() == destination_id)
            else {
                continue;
            };
            if origin.departure_time < after {
                continue;
            }
            // Trips iterate in hash order; break departure ties on trip id
            // so the result is stable.
            let replace = match &best {
                None => true,
                Some(current) => {
                    origin.departure_time < current.departure_time
                        || (origin.departure_time == current.departure_time
                            && trip_id.as_ref() < current.trip_id.as_ref())
                }
            };
            if replace {
                best = Some(TripSummary {
                    trip_id: trip_id.clone(),
                    origin: self.stops[origin.stop_idx as usize].name.clone(),
                    destination: self.stops[destination.stop_idx as usize].name.clone(),
                    departure_time: origin.departure_time,
                    arrival_time: destination.arrival_time,
                });
            }
        }
        best.ok_or_else(|| TripError::NoUpcomingTrip {
            from: origin_id.to_string(),
            to: destination_id.to_string(),
        })
    }

    /// Picks one delay record uniformly at random. The generator is
    /// caller-supplied; pass a seeded one for reproducible draws.
    pub fn sample_delay_log<R: rand::Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<&DelayRecord, EmptyDelayLog> {
        self.delay_logs.choose(rng).ok_or(EmptyDelayLog)
    }
}
