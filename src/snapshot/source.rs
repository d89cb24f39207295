use super::{DelayRecord, Error, Snapshot, Stop, StopTime};
use crate::{feed::Feed, shared::time::Time};
use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};
use tracing::{debug, info};

impl Snapshot {
    /// Streams the schedule tables out of the feed and keeps only the
    /// trips inside the snapshot window. This is the whole write path of
    /// the snapshot; everything after it is read-only.
    pub fn load_schedule(mut self, feed: Feed) -> Result<Self, Error> {
        self.load_stops(&feed)?;
        let services = self.load_services(&feed)?;
        let trips = self.load_trips(&feed, &services)?;
        self.load_stop_times(&feed, &trips)?;
        info!(
            stops = self.stops.len(),
            trips = self.trip_to_stop_times.len(),
            stop_times = self.stop_times.len(),
            "Schedule snapshot ready"
        );
        Ok(self)
    }

    fn load_stops(&mut self, feed: &Feed) -> Result<(), Error> {
        debug!("Loading stops...");
        let now = Instant::now();
        let mut stop_lookup: HashMap<Arc<str>, usize> = HashMap::new();
        let mut stops: Vec<Stop> = Vec::new();
        feed.stream_stops(|i, row| -> Result<(), Error> {
            let embedding =
                parse_embedding(&row.embedding).map_err(|reason| Error::MalformedEmbedding {
                    stop_id: row.stop_id.clone(),
                    reason,
                })?;
            let stop = Stop {
                index: i as u32,
                id: row.stop_id.into(),
                name: row.stop_name.into(),
                coordinate: (row.stop_lat, row.stop_lon).into(),
                embedding,
            };
            stop_lookup.insert(stop.id.clone(), i);
            stops.push(stop);
            Ok(())
        })?;
        self.stops = stops.into();
        self.stop_lookup = stop_lookup;
        debug!("Loaded {} stops in {:?}", self.stops.len(), now.elapsed());
        Ok(())
    }

    /// Service ids in this feed are date-valued; a service is inside the
    /// snapshot when that date falls inside the window.
    fn load_services(&self, feed: &Feed) -> Result<HashSet<String>, Error> {
        debug!("Loading calendar dates...");
        let window = &self.window;
        let mut services: HashSet<String> = HashSet::new();
        feed.stream_calendar_dates(|_, row| -> Result<(), Error> {
            let date = NaiveDate::parse_from_str(&row.service_id, "%Y%m%d").map_err(|_| {
                Error::MalformedServiceDate {
                    value: row.service_id.clone(),
                }
            })?;
            if window.contains(date) {
                services.insert(row.service_id);
            }
            Ok(())
        })?;
        debug!("{} service days inside the window", services.len());
        Ok(services)
    }

    fn load_trips(&self, feed: &Feed, services: &HashSet<String>) -> Result<HashSet<String>, Error> {
        debug!("Loading trips...");
        let window = &self.window;
        let mut trips: HashSet<String> = HashSet::new();
        feed.stream_trips(|_, row| -> Result<(), Error> {
            if services.contains(&row.service_id) && row.route_id.ends_with(&window.corridor) {
                trips.insert(row.trip_id);
            }
            Ok(())
        })?;
        if trips.is_empty() {
            return Err(Error::EmptyWindow {
                corridor: window.corridor.clone(),
                start: window.start,
                end: window.end,
            });
        }
        debug!("{} trips survive the corridor/date filter", trips.len());
        Ok(trips)
    }

    fn load_stop_times(&mut self, feed: &Feed, trips: &HashSet<String>) -> Result<(), Error> {
        debug!("Loading stop times...");
        let now = Instant::now();
        let mut per_trip: HashMap<Arc<str>, Vec<StopTime>> = HashMap::new();
        feed.stream_stop_times(|_, row| -> Result<(), Error> {
            if !trips.contains(&row.trip_id) {
                return Ok(());
            }
            let stop_index = *self.stop_lookup.get(row.stop_id.as_str()).ok_or_else(|| {
                Error::UnknownStop {
                    trip_id: row.trip_id.clone(),
                    stop_id: row.stop_id.clone(),
                }
            })?;
            let stop = &self.stops[stop_index];
            let arrival_time =
                Time::from_hms(&row.arrival_time).ok_or_else(|| Error::MalformedTime {
                    value: row.arrival_time.clone(),
                    trip_id: row.trip_id.clone(),
                })?;
            let departure_time =
                Time::from_hms(&row.departure_time).ok_or_else(|| Error::MalformedTime {
                    value: row.departure_time.clone(),
                    trip_id: row.trip_id.clone(),
                })?;
            let trip_id = match per_trip.get_key_value(row.trip_id.as_str()) {
                Some((key, _)) => key.clone(),
                None => Arc::from(row.trip_id.as_str()),
            };
            per_trip.entry(trip_id.clone()).or_default().push(StopTime {
                trip_id,
                stop_idx: stop_index as u32,
                stop_id: stop.id.clone(),
                sequence: row.stop_sequence,
                arrival_time,
                departure_time,
                headsign: row.stop_headsign.map(|val| val.into()),
            });
            Ok(())
        })?;

        let mut stop_times: Vec<StopTime> = Vec::new();
        let mut trip_to_stop_times: HashMap<Arc<str>, Box<[usize]>> =
            HashMap::with_capacity(per_trip.len());
        for (trip_id, mut rows) in per_trip {
            // Stable sort: duplicate sequence values keep table order
            rows.sort_by_key(|row| row.sequence);
            let start = stop_times.len();
            let indexes: Vec<usize> = (start..start + rows.len()).collect();
            stop_times.append(&mut rows);
            trip_to_stop_times.insert(trip_id, indexes.into());
        }
        self.stop_times = stop_times.into();
        self.trip_to_stop_times = trip_to_stop_times;
        debug!(
            "Loaded {} stop times in {:?}",
            self.stop_times.len(),
            now.elapsed()
        );
        Ok(())
    }

    /// Streams the operational log tables, attaches each operation's
    /// delay code and reason, and keeps the records inside the window
    /// that have an attributed cause, sorted by timestamp ascending.
    pub fn load_delay_logs(mut self, feed: Feed) -> Result<Self, Error> {
        debug!("Loading delay logs...");
        let now = Instant::now();

        // First attribution per trip wins; the source join would
        // otherwise fan one operation out into several records.
        let mut code_for_trip: HashMap<String, Option<String>> = HashMap::new();
        feed.stream_attributions(|_, row| -> Result<(), Error> {
            code_for_trip.entry(row.trip_id).or_insert(row.delay_code);
            Ok(())
        })?;

        let mut reason_for_code: HashMap<String, Arc<str>> = HashMap::new();
        feed.stream_delay_codes(|_, row| -> Result<(), Error> {
            let reason: Arc<str> = row.delay_reason.into();
            reason_for_code.entry(row.delay_code).or_insert(reason);
            Ok(())
        })?;

        let window = &self.window;
        let mut records: Vec<DelayRecord> = Vec::new();
        feed.stream_operations(|_, row| -> Result<(), Error> {
            let operated_at =
                NaiveDateTime::parse_from_str(&row.operation_date_time, "%Y-%m-%d %H:%M:%S")
                    .map_err(|_| Error::MalformedTimestamp {
                        value: row.operation_date_time.clone(),
                    })?;
            if !window.contains(operated_at.date()) || row.corridor_id != window.corridor {
                return Ok(());
            }
            // Operations without an attributed cause carry nothing to analyze
            let Some(Some(code)) = code_for_trip.get(&row.trip_id) else {
                return Ok(());
            };
            let reason = reason_for_code.get(code.as_str()).cloned();
            records.push(DelayRecord {
                operated_at,
                trip_id: row.trip_id.into(),
                corridor: row.corridor_id.into(),
                code: code.as_str().into(),
                reason,
            });
            Ok(())
        })?;

        records.par_sort_by_key(|record| record.operated_at);
        self.delay_logs = records.into();
        debug!(
            "Loaded {} delay records in {:?}",
            self.delay_logs.len(),
            now.elapsed()
        );
        Ok(self)
    }
}

fn parse_embedding(raw: &str) -> Result<Box<[f32]>, String> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| "expected a bracketed float array".to_string())?;
    if inner.trim().is_empty() {
        return Err("empty embedding".to_string());
    }
    let mut values = Vec::with_capacity(inner.len() / 4);
    for token in inner.split(',') {
        let token = token.trim();
        let value: f32 = token
            .parse()
            .map_err(|err| format!("bad float {token:?}: {err}"))?;
        values.push(value);
    }
    Ok(values.into())
}

#[test]
fn parse_embedding_literal() {
    let values = parse_embedding("[0.25, -1.5, 3.0]").unwrap();
    assert_eq!(values.as_ref(), &[0.25, -1.5, 3.0]);
}

#[test]
fn parse_embedding_rejects_garbage() {
    assert!(parse_embedding("0.25, -1.5").is_err());
    assert!(parse_embedding("[]").is_err());
    assert!(parse_embedding("[0.25, x]").is_err());
}
