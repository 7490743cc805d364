//! Per-station daily demand series and weekly seasonality removal.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::analyzers::regression::OlsFit;
use crate::analyzers::types::DetrendedSeries;
use crate::analyzers::utility::mean;
use crate::error::{AnalysisError, Result};
use crate::trips::{StationId, TripRecord};

/// Intercept plus one indicator for every weekday except the reference day.
const WEEKDAY_PARAMETERS: usize = 7;

/// How the seasonal component of a daily series is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetrendMethod {
    /// Regress counts on day-of-week indicators.
    #[default]
    DayOfWeek,
    /// Use the overall series mean.
    Mean,
}

/// Trips ending at `station_id` per calendar date, oldest first.
pub fn daily_trip_counts(trips: &[TripRecord], station_id: StationId) -> Vec<(NaiveDate, usize)> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for trip in trips.iter().filter(|t| t.end_station_id == station_id) {
        *counts.entry(trip.end_time.date()).or_default() += 1;
    }
    counts.into_iter().collect()
}

pub fn detrend(
    trips: &[TripRecord],
    station_id: StationId,
    method: DetrendMethod,
) -> Result<DetrendedSeries> {
    match method {
        DetrendMethod::DayOfWeek => detrend_daily_series(trips, station_id),
        DetrendMethod::Mean => detrend_by_mean(trips, station_id),
    }
}

/// Removes day-of-week seasonality from a station's daily trip counts.
///
/// Counts are regressed on an intercept and six weekday indicators, with
/// Sunday as the reference level. The fitted values are the seasonal
/// component and the residuals the detrended series.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientData`] if the station has fewer than
/// seven distinct dates or the dates do not cover every weekday.
pub fn detrend_daily_series(trips: &[TripRecord], station_id: StationId) -> Result<DetrendedSeries> {
    let (dates, counts) = split(daily_trip_counts(trips, station_id));

    if dates.len() < WEEKDAY_PARAMETERS {
        return Err(AnalysisError::InsufficientData(format!(
            "station {station_id} has {} dates, at least {WEEKDAY_PARAMETERS} required",
            dates.len()
        )));
    }

    let weekdays: HashSet<u32> = dates
        .iter()
        .map(|d| d.weekday().num_days_from_monday())
        .collect();
    if weekdays.len() < 7 {
        return Err(AnalysisError::InsufficientData(format!(
            "station {station_id} has trips on only {} distinct weekdays",
            weekdays.len()
        )));
    }

    let design = weekday_design(&dates);
    let fit = OlsFit::fit(&design, &counts)?;
    let seasonal = fit.predict(&design);

    debug!(station_id, dates = dates.len(), "Fitted weekday model");
    Ok(DetrendedSeries::new(station_id, dates, counts, seasonal))
}

/// Subtracts the series mean from a station's daily trip counts.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientData`] if the station has no trips.
pub fn detrend_by_mean(trips: &[TripRecord], station_id: StationId) -> Result<DetrendedSeries> {
    let (dates, counts) = split(daily_trip_counts(trips, station_id));

    if dates.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "station {station_id} has no trips"
        )));
    }

    let average = mean(&counts);
    let seasonal = vec![average; counts.len()];
    Ok(DetrendedSeries::new(station_id, dates, counts, seasonal))
}

fn split(series: Vec<(NaiveDate, usize)>) -> (Vec<NaiveDate>, Vec<f64>) {
    series
        .into_iter()
        .map(|(date, count)| (date, count as f64))
        .unzip()
}

/// `[1, mon, tue, wed, thu, fri, sat]` for each date.
fn weekday_design(dates: &[NaiveDate]) -> Vec<Vec<f64>> {
    dates
        .iter()
        .map(|date| {
            let weekday = date.weekday().num_days_from_monday() as usize;
            let mut row = vec![0.0; WEEKDAY_PARAMETERS];
            row[0] = 1.0;
            if weekday < WEEKDAY_PARAMETERS - 1 {
                row[weekday + 1] = 1.0;
            }
            row
        })
        .collect()
}
