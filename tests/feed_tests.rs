use corridor::feed::{Config, Error, Feed};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn stream_stops_from_dir() {
    let feed = Feed::new(Config::default()).from_dir(fixture("gtfs"));
    let mut names = Vec::new();
    feed.stream_stops(|_, row| -> Result<(), Error> {
        names.push(row.stop_name);
        Ok(())
    })
    .unwrap();
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "Union Station");
}

#[test]
fn stream_stops_from_zip() {
    let feed = Feed::new(Config::default()).from_zip(fixture("gtfs.zip"));
    let mut count = 0;
    feed.stream_stops(|_, row| -> Result<(), Error> {
        assert!(!row.stop_id.is_empty());
        assert!(row.embedding.starts_with('['));
        count += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(count, 7);
}

#[test]
fn empty_headsign_becomes_none() {
    let feed = Feed::new(Config::default()).from_dir(fixture("gtfs"));
    let mut headsigns = Vec::new();
    feed.stream_stop_times(|_, row| -> Result<(), Error> {
        if row.trip_id == "20180301-LE-911" {
            headsigns.push(row.stop_headsign);
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(headsigns.len(), 3);
    assert!(headsigns[0].is_none());
    assert_eq!(headsigns[1].as_deref(), Some("Oshawa GO"));
}

#[test]
fn missing_table_is_an_error() {
    // the delay dir has no stops.csv
    let feed = Feed::new(Config::default()).from_dir(fixture("delay"));
    let result = feed.stream_stops(|_, _| -> Result<(), Error> { Ok(()) });
    assert!(matches!(result, Err(Error::TableNotFound(_))));
}

#[test]
fn malformed_row_is_an_error() {
    let feed = Feed::new(Config::default()).from_dir(fixture("malformed"));
    let result = feed.stream_stops(|_, _| -> Result<(), Error> { Ok(()) });
    assert!(matches!(result, Err(Error::Csv(_))));
}

#[test]
fn unconfigured_feed_streams_nothing() {
    let feed = Feed::new(Config::default());
    let mut count = 0;
    feed.stream_trips(|_, _| -> Result<(), Error> {
        count += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn delay_tables_stream_with_pascal_case_headers() {
    let feed = Feed::new(Config::default()).from_dir(fixture("delay"));
    let mut codes = Vec::new();
    feed.stream_attributions(|_, row| -> Result<(), Error> {
        codes.push((row.trip_id, row.delay_code));
        Ok(())
    })
    .unwrap();
    assert_eq!(codes.len(), 5);
    // the unattributed trip comes through as None, not an empty string
    let unattributed = codes
        .iter()
        .find(|(trip_id, _)| trip_id == "20180301-LE-909")
        .unwrap();
    assert!(unattributed.1.is_none());
}
