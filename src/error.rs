//! Error taxonomy shared by every analysis in the crate.

use crate::trips::StationId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The trip table lacks a column the analyses depend on.
    #[error("trip table is missing required column '{0}'")]
    MissingColumn(String),

    /// A station id has no coordinate entry.
    #[error("station {0} has no coordinate entry")]
    StationNotFound(StationId),

    /// A coordinate could not be resolved back to a station id.
    #[error("no station found at coordinate ({lon}, {lat})")]
    CoordinateNotFound { lon: f64, lat: f64 },

    /// Not enough observations to satisfy a fixed requirement.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// One station id was seen with more than one coordinate.
    #[error(
        "station {station_id} has inconsistent coordinates ({first_lon}, {first_lat}) and ({second_lon}, {second_lat})"
    )]
    AmbiguousStation {
        station_id: StationId,
        first_lon: f64,
        first_lat: f64,
        second_lon: f64,
        second_lat: f64,
    },

    /// Two station ids share the exact same coordinate.
    #[error("coordinate ({lon}, {lat}) is shared by stations {first} and {second}")]
    AmbiguousCoordinate {
        lon: f64,
        lat: f64,
        first: StationId,
        second: StationId,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
