use chrono::NaiveDate;
use corridor::feed::{Config, Feed};
use corridor::resolver::{Embedder, StopQuery};
use corridor::shared::time::Time;
use corridor::snapshot::{Snapshot, TripError, Window};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn lakeshore_snapshot() -> Snapshot {
    let window = Window {
        start: NaiveDate::from_ymd_opt(2018, 3, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2018, 3, 8).unwrap(),
        corridor: "LE".into(),
    };
    Snapshot::new(window)
        .load_schedule(Feed::new(Config::default()).from_dir(fixture("gtfs")))
        .unwrap()
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 3, day).unwrap()
}

#[test]
fn assemble_the_morning_express() {
    let snapshot = lakeshore_snapshot();
    let trip = snapshot.trip_info("907", march(1), "LE").unwrap();

    assert_eq!(trip.trip_id.as_ref(), "20180301-LE-907");
    assert_eq!(trip.headsign.as_ref(), "Union Station");
    assert_eq!(trip.origin.as_ref(), "Oshawa GO");
    assert_eq!(trip.destination.as_ref(), "Union Station");
    assert_eq!(trip.departure_time, Time::from_hms("07:42:00").unwrap());
    assert_eq!(trip.arrival_time, Time::from_hms("08:45:00").unwrap());
}

#[test]
fn itinerary_is_ascending_with_no_duplicate_sequences() {
    let snapshot = lakeshore_snapshot();
    let trip = snapshot.trip_info("907", march(1), "LE").unwrap();

    let sequences: Vec<u32> = trip.stops.iter().map(|stop| stop.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);

    // sequence 3 was duplicated in the source table; the first row wins
    let danforth = &trip.stops[2];
    assert_eq!(danforth.stop_name.as_ref(), "Danforth GO");
    assert_eq!(danforth.arrival_time, Time::from_hms("08:16:00").unwrap());
}

#[test]
fn unknown_trip_number_is_not_found() {
    let snapshot = lakeshore_snapshot();
    let result = snapshot.trip_info("999", march(1), "LE");
    assert!(matches!(result, Err(TripError::NotFound { .. })));
}

#[test]
fn trip_outside_its_service_day_is_not_found() {
    let snapshot = lakeshore_snapshot();
    // 907 runs on the 1st and 2nd, not the 5th
    assert!(snapshot.trip_info("907", march(2), "LE").is_ok());
    assert!(matches!(
        snapshot.trip_info("907", march(5), "LE"),
        Err(TripError::NotFound { .. })
    ));
}

#[test]
fn missing_headsign_on_the_first_stop_is_reported() {
    let snapshot = lakeshore_snapshot();
    let result = snapshot.trip_info("911", march(1), "LE");
    assert!(matches!(result, Err(TripError::MissingHeadsign { .. })));
}

struct ToyModel;

impl Embedder for ToyModel {
    fn encode(&self, _text: &str) -> Vec<f32> {
        vec![1.0, 0.0, 0.0, 0.0]
    }
}

#[test]
fn resolved_stop_name_survives_assembly_unchanged() {
    let snapshot = lakeshore_snapshot();
    let resolver = snapshot.resolver(&ToyModel);
    let stop = resolver
        .resolve(&StopQuery::ExactName("Danforth GO".into()))
        .unwrap();

    let trip = snapshot.trip_info("907", march(1), "LE").unwrap();
    assert!(
        trip.stops
            .iter()
            .any(|row| row.stop_name.as_ref() == stop.name.as_ref())
    );
}

#[test]
fn next_trip_takes_the_earliest_departure() {
    let snapshot = lakeshore_snapshot();
    let trip = snapshot
        .next_trip("OS", "UN", Time::from_hms("07:00:00").unwrap())
        .unwrap();
    // two trips leave Oshawa at 07:42 on different service days; the
    // tie breaks on trip id
    assert_eq!(trip.trip_id.as_ref(), "20180301-LE-907");
    assert_eq!(trip.origin.as_ref(), "Oshawa GO");
    assert_eq!(trip.destination.as_ref(), "Union Station");
    assert_eq!(trip.departure_time, Time::from_hms("07:42:00").unwrap());
    assert_eq!(trip.arrival_time, Time::from_hms("08:45:00").unwrap());
}

#[test]
fn next_trip_skips_departures_already_gone() {
    let snapshot = lakeshore_snapshot();
    let trip = snapshot
        .next_trip("OS", "UN", Time::from_hms("08:00:00").unwrap())
        .unwrap();
    assert_eq!(trip.trip_id.as_ref(), "20180301-LE-909");
    assert_eq!(trip.departure_time, Time::from_hms("09:15:00").unwrap());
}

#[test]
fn next_trip_respects_stop_order() {
    let snapshot = lakeshore_snapshot();
    // the only trip serving Union before Oshawa is the evening 911
    let trip = snapshot
        .next_trip("UN", "OS", Time::from_hms("12:00:00").unwrap())
        .unwrap();
    assert_eq!(trip.trip_id.as_ref(), "20180301-LE-911");
}

#[test]
fn next_trip_errors_once_the_day_is_exhausted() {
    let snapshot = lakeshore_snapshot();
    let result = snapshot.next_trip("OS", "UN", Time::from_hms("23:00:00").unwrap());
    assert!(matches!(result, Err(TripError::NoUpcomingTrip { .. })));
}
