//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON serialization, CSV append and CSV export.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Logs a result using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a result as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &str, record: &T) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

/// Writes `rows` to a fresh CSV file at `path`, replacing any existing file.
pub fn write_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV file");

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{BikeCount, DetrendedSeries};
    use crate::stats::DatasetStats;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let stats = DatasetStats::default();
        print_pretty(&stats);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let stats = DatasetStats::default();
        print_json(&stats).unwrap();
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("bikeshare_explorer_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let stats = DatasetStats::default();
        append_record(&path, &stats).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("bikeshare_explorer_test_header.csv");
        let _ = fs::remove_file(&path);

        let stats = DatasetStats::default();
        append_record(&path, &stats).unwrap();
        append_record(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);

        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_records_replaces_file() {
        let path = temp_path("bikeshare_explorer_test_bikes.csv");
        let rows = vec![
            BikeCount { bike_id: 7, count: 3 },
            BikeCount { bike_id: 2, count: 1 },
        ];

        write_records(&path, &rows).unwrap();
        write_records(&path, &rows[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["bike_id,count", "7,3"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_series_rows() {
        let path = temp_path("bikeshare_explorer_test_series.csv");
        let date = NaiveDate::from_ymd_opt(2017, 6, 5).unwrap();
        let series = DetrendedSeries::new(3, vec![date], vec![4.0], vec![2.5]);

        write_records(&path, &series.rows()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "index,date,count,seasonal,detrended");
        assert_eq!(lines[1], "0,2017-06-05,4.0,2.5,1.5");

        fs::remove_file(&path).unwrap();
    }
}
