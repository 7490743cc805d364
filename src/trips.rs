//! Trip table row type and the small value types derived from it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

pub type StationId = i64;
pub type BikeId = i64;

/// Timestamp layouts accepted for `start_time` / `end_time`.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One bike rental event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TripRecord {
    pub start_station_id: StationId,
    pub start_station_name: String,
    pub end_station_id: StationId,
    pub end_station_name: String,
    pub start_station_longitude: f64,
    pub start_station_latitude: f64,
    #[serde(default)]
    pub end_station_longitude: Option<f64>,
    #[serde(default)]
    pub end_station_latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_time: NaiveDateTime,
    pub day: u32,
    pub month: u32,
    pub bike_id: BikeId,
    #[serde(deserialize_with = "deserialize_flag")]
    pub malfunction: bool,
}

impl TripRecord {
    /// Coordinate of the station the trip started at.
    pub fn start_coordinate(&self) -> Coordinate {
        Coordinate::new(self.start_station_longitude, self.start_station_latitude)
    }

    pub fn is_round_trip(&self) -> bool {
        self.start_station_name == self.end_station_name
    }
}

/// A (longitude, latitude) pair usable as a map key.
///
/// Equality, hashing and ordering all work on the IEEE bit patterns, with
/// `-0.0` folded into `0.0`, so two coordinates are equal exactly when the
/// trip table recorded the same numbers.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Coordinate {
    lon: f64,
    lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon: lon + 0.0,
            lat: lat + 0.0,
        }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lon.to_bits() == other.lon.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon.to_bits().hash(state);
        self.lat.to_bits().hash(state);
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lon
            .total_cmp(&other.lon)
            .then_with(|| self.lat.total_cmp(&other.lat))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{value}'"))),
    }
}

/// Accepts the spellings pandas and spreadsheets commonly emit for booleans.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid malfunction flag '{other}'"
        ))),
    }
}
