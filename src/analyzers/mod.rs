//! Numeric analyses over a trip table.
//!
//! This module ranks existing stations by distance to newly opened ones,
//! removes weekly seasonality from per-station demand, and summarizes
//! malfunction reports per bike.

pub mod distance;
pub mod malfunction;
pub mod neighbors;
pub mod regression;
pub mod seasonal;
pub mod types;
pub mod utility;
