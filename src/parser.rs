//! CSV parser for bike-share trip tables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::trips::TripRecord;

/// Columns every trip table must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "start_station_id",
    "start_station_name",
    "end_station_id",
    "end_station_name",
    "start_station_longitude",
    "start_station_latitude",
    "end_time",
    "day",
    "month",
    "bike_id",
    "malfunction",
];

/// Decodes a trip table from CSV bytes.
///
/// # Errors
///
/// Returns [`AnalysisError::MissingColumn`] for the first required column the
/// header row lacks, or a CSV error if a row does not deserialize.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<TripRecord>> {
    read_trips(bytes)
}

/// Loads a trip table from a CSV file on disk.
pub fn load_trips(path: impl AsRef<Path>) -> Result<Vec<TripRecord>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading trip table");
    let file = File::open(path)?;
    read_trips(file)
}

fn read_trips<R: Read>(reader: R) -> Result<Vec<TripRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(AnalysisError::MissingColumn((*column).to_string()));
        }
    }

    let mut trips = Vec::new();
    for result in rdr.deserialize() {
        let record: TripRecord = result?;
        trips.push(record);
    }

    debug!(rows = trips.len(), "Trip table parsed");
    Ok(trips)
}
