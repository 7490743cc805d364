//! Nearest-neighbor siting analysis for newly opened stations.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::analyzers::distance::rank_by_distance;
use crate::analyzers::types::NeighborProposal;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::stations::{StationIndex, unique_coordinates};
use crate::trips::{StationId, TripRecord};

/// Finds the nearest existing stations for each proposed station.
///
/// Candidates are the distinct start coordinates of `current`, ranked by
/// Euclidean distance to the proposed station's coordinate in `next`. Every
/// candidate is resolved to a station id through `activity`. The baseline
/// list takes the first `neighbor_count` candidates as they come; the filtered
/// list only accepts stations that, in the month of `current`'s first trip,
/// have trips on more than `min_active_days` distinct days.
///
/// # Errors
///
/// - [`AnalysisError::StationNotFound`] if a proposed station never starts a
///   trip in `next`.
/// - [`AnalysisError::CoordinateNotFound`] if a ranked candidate has no
///   station in `activity`.
/// - [`AnalysisError::InsufficientData`] if `current` is empty, the neighbor
///   count is zero, or (in strict mode) a list comes up short.
/// - Ambiguity errors from building the station indexes.
pub fn propose_neighbors(
    activity: &[TripRecord],
    current: &[TripRecord],
    next: &[TripRecord],
    proposed: &[StationId],
    config: &AnalysisConfig,
) -> Result<NeighborProposal> {
    let k = config.neighbor_count;
    if k == 0 {
        return Err(AnalysisError::InsufficientData(
            "neighbor count must be at least 1".to_string(),
        ));
    }

    let month = current
        .first()
        .map(|t| t.month)
        .ok_or_else(|| AnalysisError::InsufficientData("current period has no trips".to_string()))?;

    let current_index = StationIndex::build(current)?;
    let next_index = StationIndex::build(next)?;
    let activity_index = StationIndex::build(activity)?;

    let candidates = unique_coordinates(current);
    let points: Vec<[f64; 2]> = candidates.iter().map(|c| c.as_array()).collect();
    let active_days = active_days_in_month(activity, month);

    debug!(
        candidates = candidates.len(),
        proposed = proposed.len(),
        month,
        "Ranking neighbors"
    );

    let mut filtered = BTreeMap::new();
    let mut baseline = BTreeMap::new();

    for &station in proposed {
        let origin = next_index.coordinate(station)?;

        let mut near: Vec<StationId> = Vec::with_capacity(k);
        let mut active: Vec<StationId> = Vec::with_capacity(k);

        for idx in rank_by_distance(origin.as_array(), &points) {
            if near.len() == k && active.len() == k {
                break;
            }

            let sid = activity_index.station_at(&candidates[idx])?;

            if near.len() < k {
                near.push(sid);
            }

            let days = active_days.get(&sid).map_or(0, HashSet::len);
            if active.len() < k && days > config.min_active_days {
                active.push(sid);
            }
        }

        if active.len() < k || near.len() < k {
            if config.strict_neighbors {
                return Err(AnalysisError::InsufficientData(format!(
                    "station {station} has {} active and {} total neighbors, {k} required",
                    active.len(),
                    near.len()
                )));
            }
            warn!(
                station,
                active = active.len(),
                baseline = near.len(),
                required = k,
                "Neighbor list is short"
            );
        }

        filtered.insert(station, active);
        baseline.insert(station, near);
    }

    info!(proposed = filtered.len(), "Neighbor proposal complete");

    Ok(NeighborProposal {
        filtered,
        baseline,
        current_coords: current_index.into_coordinates(),
        next_coords: next_index.into_coordinates(),
    })
}

/// Distinct `day` values per start station, restricted to one month.
fn active_days_in_month(trips: &[TripRecord], month: u32) -> HashMap<StationId, HashSet<u32>> {
    let mut days: HashMap<StationId, HashSet<u32>> = HashMap::new();
    for trip in trips.iter().filter(|t| t.month == month) {
        days.entry(trip.start_station_id).or_default().insert(trip.day);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::fixtures::trip;

    /// One trip per day for `days` days at the given station.
    fn daily_trips(id: StationId, lon: f64, lat: f64, days: u32) -> Vec<TripRecord> {
        (1..=days)
            .map(|day| {
                let mut t = trip(id, lon, lat);
                t.day = day;
                t
            })
            .collect()
    }

    fn config(k: usize) -> AnalysisConfig {
        AnalysisConfig {
            neighbor_count: k,
            min_active_days: 25,
            strict_neighbors: false,
        }
    }

    /// Stations 1..=5 on the x axis at distance 1..=5 from the origin.
    /// Station 2 and 4 are quiet (only 10 days of trips).
    fn scenario() -> (Vec<TripRecord>, Vec<TripRecord>) {
        let mut current = Vec::new();
        for id in 1..=5 {
            let days = if id == 2 || id == 4 { 10 } else { 30 };
            current.extend(daily_trips(id, id as f64, 0.0, days));
        }
        let mut next = current.clone();
        next.push(trip(100, 0.0, 0.0));
        (current, next)
    }

    #[test]
    fn test_baseline_is_nearest_k() {
        let (current, next) = scenario();
        let result = propose_neighbors(&current, &current, &next, &[100], &config(3)).unwrap();

        assert_eq!(result.baseline[&100], vec![1, 2, 3]);
    }

    #[test]
    fn test_filtered_skips_quiet_stations() {
        let (current, next) = scenario();
        let result = propose_neighbors(&current, &current, &next, &[100], &config(3)).unwrap();

        assert_eq!(result.filtered[&100], vec![1, 3, 5]);
    }

    #[test]
    fn test_coordinate_maps_are_returned() {
        let (current, next) = scenario();
        let result = propose_neighbors(&current, &current, &next, &[100], &config(3)).unwrap();

        assert_eq!(result.current_coords.len(), 5);
        assert_eq!(result.next_coords.len(), 6);
        assert!(result.next_coords.contains_key(&100));
    }

    #[test]
    fn test_short_list_is_returned_when_not_strict() {
        let (current, next) = scenario();
        let result = propose_neighbors(&current, &current, &next, &[100], &config(4)).unwrap();

        assert_eq!(result.filtered[&100], vec![1, 3, 5]);
        assert_eq!(result.baseline[&100], vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_short_list_fails_when_strict() {
        let (current, next) = scenario();
        let mut cfg = config(4);
        cfg.strict_neighbors = true;

        let result = propose_neighbors(&current, &current, &next, &[100], &cfg);
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let current = daily_trips(1, 1.0, 0.0, 25);
        let mut next = current.clone();
        next.push(trip(100, 0.0, 0.0));

        let result = propose_neighbors(&current, &current, &next, &[100], &config(1)).unwrap();
        assert!(result.filtered[&100].is_empty());
        assert_eq!(result.baseline[&100], vec![1]);
    }

    #[test]
    fn test_activity_counts_only_current_month() {
        let mut current = daily_trips(1, 1.0, 0.0, 5);
        let mut other_month = daily_trips(1, 1.0, 0.0, 30);
        for t in &mut other_month {
            t.month = 7;
        }
        let mut activity = current.clone();
        activity.extend(other_month);
        current.truncate(1);

        let mut next = current.clone();
        next.push(trip(100, 0.0, 0.0));

        let result = propose_neighbors(&activity, &current, &next, &[100], &config(1)).unwrap();
        assert!(result.filtered[&100].is_empty());
    }

    #[test]
    fn test_unknown_proposed_station() {
        let (current, next) = scenario();
        let result = propose_neighbors(&current, &current, &next, &[999], &config(3));
        assert!(matches!(result, Err(AnalysisError::StationNotFound(999))));
    }

    #[test]
    fn test_candidate_missing_from_activity() {
        let (current, next) = scenario();
        let activity = daily_trips(3, 3.0, 0.0, 30);
        let result = propose_neighbors(&activity, &current, &next, &[100], &config(3));
        assert!(matches!(
            result,
            Err(AnalysisError::CoordinateNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_current_period() {
        let (_, next) = scenario();
        let result = propose_neighbors(&[], &[], &next, &[100], &config(3));
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_zero_neighbor_count() {
        let (current, next) = scenario();
        let result = propose_neighbors(&current, &current, &next, &[100], &config(0));
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_every_proposed_station_has_entries() {
        let (current, mut next) = scenario();
        next.push(trip(101, 5.5, 0.0));

        let result =
            propose_neighbors(&current, &current, &next, &[100, 101], &config(3)).unwrap();

        assert_eq!(result.filtered.len(), 2);
        assert_eq!(result.baseline.len(), 2);
        assert_eq!(result.baseline[&101], vec![5, 4, 3]);
        assert_eq!(result.filtered[&101], vec![5, 3, 1]);
        for list in result.filtered.values().chain(result.baseline.values()) {
            assert!(list.len() <= 3);
        }
    }
}
