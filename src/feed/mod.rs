use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;
use zip::ZipArchive;

mod config;
pub mod models;
pub use config::*;
use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find table: {0}")]
    TableNotFound(String),
}

#[derive(Default)]
pub enum StorageType {
    #[default]
    None,
    Dir(PathBuf),
    Zip(PathBuf),
}

/// A set of CSV tables living in a directory or a zip archive.
/// Rows are streamed to the caller one table at a time; nothing is held
/// in memory here.
#[derive(Default)]
pub struct Feed {
    config: Config,
    storage: StorageType,
}

impl Feed {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_dir(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Dir(path);
        self
    }

    pub fn from_zip(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Zip(path);
        self
    }

    pub fn stream_stops<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, StopRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.stops_path, f)
    }

    pub fn stream_calendar_dates<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, CalendarDateRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.calendar_dates_path, f)
    }

    pub fn stream_trips<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, TripRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.trips_path, f)
    }

    pub fn stream_stop_times<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, StopTimeRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.stop_times_path, f)
    }

    pub fn stream_operations<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, OperationRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.operations_path, f)
    }

    pub fn stream_attributions<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, AttributionRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.attributions_path, f)
    }

    pub fn stream_delay_codes<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(usize, DelayCodeRow) -> Result<(), E>,
        E: From<Error>,
    {
        self.stream(&self.config.delay_codes_path, f)
    }

    fn stream<T, F, E>(&self, name: &str, f: F) -> Result<(), E>
    where
        T: DeserializeOwned,
        F: FnMut(usize, T) -> Result<(), E>,
        E: From<Error>,
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Dir(path) => stream_from_dir(path, name, f),
            StorageType::Zip(path) => stream_from_zip(path, name, f),
        }
    }
}

fn stream_from_dir<T, F, E>(dir: &Path, name: &str, f: F) -> Result<(), E>
where
    T: DeserializeOwned,
    F: FnMut(usize, T) -> Result<(), E>,
    E: From<Error>,
{
    let path = dir.join(name);
    if !path.is_file() {
        return Err(Error::TableNotFound(name.to_string()).into());
    }
    let file = File::open(path).map_err(Error::from)?;
    read_rows(file, f)
}

fn stream_from_zip<T, F, E>(zip_path: &Path, name: &str, f: F) -> Result<(), E>
where
    T: DeserializeOwned,
    F: FnMut(usize, T) -> Result<(), E>,
    E: From<Error>,
{
    let zip_file = File::open(zip_path).map_err(Error::from)?;
    let mut archive = ZipArchive::new(zip_file).map_err(Error::from)?;
    let index = archive
        .index_for_name(name)
        .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
    let file = archive.by_index(index).map_err(Error::from)?;
    read_rows(file, f)
}

/// A row that fails to deserialize aborts the whole stream. A partial
/// table must never turn into a loaded snapshot.
fn read_rows<R, T, F, E>(reader: R, mut f: F) -> Result<(), E>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(usize, T) -> Result<(), E>,
    E: From<Error>,
{
    let mut rdr = csv::Reader::from_reader(reader);
    for (i, row) in rdr.deserialize().enumerate() {
        let row: T = row.map_err(Error::from)?;
        f(i, row)?;
    }
    Ok(())
}
