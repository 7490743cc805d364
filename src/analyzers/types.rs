//! Result types produced by the analyzers.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::utility::{mean, stddev};
use crate::trips::{BikeId, Coordinate, StationId};

/// Nearest existing stations for every proposed station.
#[derive(Debug, Serialize)]
pub struct NeighborProposal {
    /// Nearest neighbors that pass the activity filter.
    pub filtered: BTreeMap<StationId, Vec<StationId>>,
    /// Nearest neighbors with no filter applied.
    pub baseline: BTreeMap<StationId, Vec<StationId>>,
    pub current_coords: BTreeMap<StationId, Coordinate>,
    pub next_coords: BTreeMap<StationId, Coordinate>,
}

/// Daily trip counts for one station with a seasonal component removed.
#[derive(Debug, Serialize)]
pub struct DetrendedSeries {
    pub station_id: StationId,
    pub dates: Vec<NaiveDate>,
    pub counts: Vec<f64>,
    pub seasonal: Vec<f64>,
    /// `(position, count - seasonal)` for every date, in date order.
    pub detrended: Vec<(usize, f64)>,
}

/// One line of a [`DetrendedSeries`] when written out as CSV.
#[derive(Debug, Serialize)]
pub struct SeriesRow {
    pub index: usize,
    pub date: NaiveDate,
    pub count: f64,
    pub seasonal: f64,
    pub detrended: f64,
}

impl DetrendedSeries {
    pub fn new(
        station_id: StationId,
        dates: Vec<NaiveDate>,
        counts: Vec<f64>,
        seasonal: Vec<f64>,
    ) -> Self {
        let detrended = counts
            .iter()
            .zip(&seasonal)
            .map(|(c, s)| c - s)
            .enumerate()
            .collect();

        Self {
            station_id,
            dates,
            counts,
            seasonal,
            detrended,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Population standard deviation of the detrended values.
    pub fn residual_stddev(&self) -> f64 {
        let values: Vec<f64> = self.detrended.iter().map(|(_, v)| *v).collect();
        stddev(&values, mean(&values))
    }

    pub fn rows(&self) -> Vec<SeriesRow> {
        self.detrended
            .iter()
            .map(|&(index, detrended)| SeriesRow {
                index,
                date: self.dates[index],
                count: self.counts[index],
                seasonal: self.seasonal[index],
                detrended,
            })
            .collect()
    }
}

/// Number of trips flagged as malfunctioning versus working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MalfunctionCounts {
    pub malfunctioning: usize,
    pub working: usize,
}

impl MalfunctionCounts {
    pub fn total(&self) -> usize {
        self.malfunctioning + self.working
    }
}

/// How often a single bike matched some condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BikeCount {
    pub bike_id: BikeId,
    pub count: usize,
}
