use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::analyzers::malfunction::malfunction_counts;
use crate::stations::{unique_end_stations, unique_stations};
use crate::trips::TripRecord;

/// Headline figures for one trip table.
#[derive(Debug, Default, Serialize)]
pub struct DatasetStats {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub total_trips: usize,

    // stations and fleet
    pub start_stations: usize,
    pub end_stations: usize,
    pub bikes: usize,

    // equipment
    pub malfunctions: usize,
    pub round_trips: usize,

    // time span
    pub first_trip_end: Option<NaiveDateTime>,
    pub last_trip_end: Option<NaiveDateTime>,
}

impl DatasetStats {
    pub fn from_trips(trips: &[TripRecord]) -> Self {
        let bikes: HashSet<_> = trips.iter().map(|t| t.bike_id).collect();

        DatasetStats {
            timestamp: Utc::now(),
            source: None,
            total_trips: trips.len(),
            start_stations: unique_stations(trips).len(),
            end_stations: unique_end_stations(trips).len(),
            bikes: bikes.len(),
            malfunctions: malfunction_counts(trips).malfunctioning,
            round_trips: trips.iter().filter(|t| t.is_round_trip()).count(),
            first_trip_end: trips.iter().map(|t| t.end_time).min(),
            last_trip_end: trips.iter().map(|t| t.end_time).max(),
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn malfunction_pct(&self) -> f64 {
        Self::pct(self.malfunctions, self.total_trips)
    }

    /// Records which file the stats were computed from
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::fixtures::trip;
    use chrono::NaiveDate;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(DatasetStats::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(DatasetStats::pct(50, 100), 50.0);
        assert_eq!(DatasetStats::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_trips_empty() {
        let stats = DatasetStats::from_trips(&[]);

        assert_eq!(stats.total_trips, 0);
        assert_eq!(stats.start_stations, 0);
        assert_eq!(stats.first_trip_end, None);
        assert_eq!(stats.malfunction_pct(), 0.0);
    }

    #[test]
    fn test_from_trips() {
        let mut a = trip(1, 0.0, 0.0);
        a.bike_id = 10;
        a.malfunction = true;

        let mut b = trip(2, 1.0, 1.0);
        b.bike_id = 11;
        b.end_station_id = 1;
        b.end_station_name = "Station 1".to_string();
        b.end_time = NaiveDate::from_ymd_opt(2017, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let mut c = trip(1, 0.0, 0.0);
        c.bike_id = 10;

        let stats = DatasetStats::from_trips(&[a.clone(), b.clone(), c]).with_source("june.csv");

        assert_eq!(stats.source.as_deref(), Some("june.csv"));
        assert_eq!(stats.total_trips, 3);
        assert_eq!(stats.start_stations, 2);
        assert_eq!(stats.end_stations, 1);
        assert_eq!(stats.bikes, 2);
        assert_eq!(stats.malfunctions, 1);
        assert_eq!(stats.round_trips, 2);
        assert_eq!(stats.first_trip_end, Some(a.end_time));
        assert_eq!(stats.last_trip_end, Some(b.end_time));
    }
}
