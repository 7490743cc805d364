use std::collections::HashMap;

use crate::analyzers::types::{BikeCount, MalfunctionCounts};
use crate::analyzers::utility::rank_counts;
use crate::trips::{BikeId, TripRecord};

/// Splits the table into malfunctioning and working trips.
pub fn malfunction_counts(trips: &[TripRecord]) -> MalfunctionCounts {
    let malfunctioning = trips.iter().filter(|t| t.malfunction).count();
    MalfunctionCounts {
        malfunctioning,
        working: trips.len() - malfunctioning,
    }
}

/// Malfunction reports per bike, most frequent first.
pub fn frequent_malfunction(trips: &[TripRecord]) -> Vec<BikeCount> {
    count_bikes(trips.iter().filter(|t| t.malfunction))
}

/// Trips that ended where they started, per bike, most frequent first.
pub fn same_station_trips(trips: &[TripRecord]) -> Vec<BikeCount> {
    count_bikes(trips.iter().filter(|t| t.is_round_trip()))
}

fn count_bikes<'a>(trips: impl Iterator<Item = &'a TripRecord>) -> Vec<BikeCount> {
    let mut counts: HashMap<BikeId, usize> = HashMap::new();
    for trip in trips {
        *counts.entry(trip.bike_id).or_default() += 1;
    }

    rank_counts(counts)
        .into_iter()
        .map(|(bike_id, count)| BikeCount { bike_id, count })
        .collect()
}
