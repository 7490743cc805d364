pub mod analyzers;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod stations;
pub mod stats;
pub mod trips;

pub use error::{AnalysisError, Result};
