//! Station identification and coordinate lookups derived from a trip table.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::analyzers::utility::rank_counts;
use crate::error::{AnalysisError, Result};
use crate::trips::{Coordinate, StationId, TripRecord};

/// Distinct start-station ids, in first-seen order.
pub fn unique_stations(trips: &[TripRecord]) -> Vec<StationId> {
    first_seen(trips.iter().map(|t| t.start_station_id))
}

/// Distinct end-station ids, in first-seen order.
pub fn unique_end_stations(trips: &[TripRecord]) -> Vec<StationId> {
    first_seen(trips.iter().map(|t| t.end_station_id))
}

fn first_seen(ids: impl Iterator<Item = StationId>) -> Vec<StationId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// Stations that start trips in `next` but never in `current`, ascending by id.
pub fn new_station_ids(current: &[TripRecord], next: &[TripRecord]) -> Vec<StationId> {
    let existing: HashSet<StationId> = unique_stations(current).into_iter().collect();
    let proposed: BTreeSet<StationId> = unique_stations(next)
        .into_iter()
        .filter(|id| !existing.contains(id))
        .collect();

    debug!(
        current = existing.len(),
        proposed = proposed.len(),
        "Computed new station ids"
    );
    proposed.into_iter().collect()
}

/// Distinct start coordinates, sorted by longitude then latitude.
pub fn unique_coordinates(trips: &[TripRecord]) -> Vec<Coordinate> {
    let set: BTreeSet<Coordinate> = trips.iter().map(TripRecord::start_coordinate).collect();
    set.into_iter().collect()
}

/// Maps every start station to its coordinate.
///
/// # Errors
///
/// Fails with an ambiguity error if a station id appears with two different
/// coordinates, or two station ids share one coordinate.
pub fn station_coordinates(trips: &[TripRecord]) -> Result<BTreeMap<StationId, Coordinate>> {
    StationIndex::build(trips).map(StationIndex::into_coordinates)
}

/// Trips started per station, most active first; ties go to the lower id.
pub fn station_trip_counts(trips: &[TripRecord]) -> Vec<(StationId, usize)> {
    let mut counts: HashMap<StationId, usize> = HashMap::new();
    for trip in trips {
        *counts.entry(trip.start_station_id).or_default() += 1;
    }
    rank_counts(counts)
}

/// Two-way station/coordinate index built in one pass over a trip table.
#[derive(Debug, Default)]
pub struct StationIndex {
    by_station: BTreeMap<StationId, Coordinate>,
    by_coordinate: HashMap<Coordinate, StationId>,
}

impl StationIndex {
    pub fn build(trips: &[TripRecord]) -> Result<Self> {
        let mut index = Self::default();

        for trip in trips {
            let id = trip.start_station_id;
            let coord = trip.start_coordinate();

            if let Some(known) = index.by_station.get(&id) {
                if *known != coord {
                    return Err(AnalysisError::AmbiguousStation {
                        station_id: id,
                        first_lon: known.lon(),
                        first_lat: known.lat(),
                        second_lon: coord.lon(),
                        second_lat: coord.lat(),
                    });
                }
            }

            if let Some(owner) = index.by_coordinate.get(&coord) {
                if *owner != id {
                    return Err(AnalysisError::AmbiguousCoordinate {
                        lon: coord.lon(),
                        lat: coord.lat(),
                        first: *owner,
                        second: id,
                    });
                }
            }

            index.by_station.insert(id, coord);
            index.by_coordinate.insert(coord, id);
        }

        Ok(index)
    }

    pub fn coordinate(&self, id: StationId) -> Result<Coordinate> {
        self.by_station
            .get(&id)
            .copied()
            .ok_or(AnalysisError::StationNotFound(id))
    }

    pub fn station_at(&self, coord: &Coordinate) -> Result<StationId> {
        self.by_coordinate
            .get(coord)
            .copied()
            .ok_or(AnalysisError::CoordinateNotFound {
                lon: coord.lon(),
                lat: coord.lat(),
            })
    }

    pub fn len(&self) -> usize {
        self.by_station.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_station.is_empty()
    }

    pub fn into_coordinates(self) -> BTreeMap<StationId, Coordinate> {
        self.by_station
    }
}
