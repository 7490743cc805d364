//! Tunable analysis parameters.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Parameters for the neighbor search.
///
/// Stored as a JSON object on disk; any omitted field keeps its default:
/// ```json
/// {
///   "neighbor_count": 3,
///   "min_active_days": 25,
///   "strict_neighbors": false
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How many neighbors to keep per proposed station.
    pub neighbor_count: usize,
    /// A station is active when it has trips on more than this many distinct days.
    pub min_active_days: usize,
    /// Fail instead of returning a short neighbor list.
    pub strict_neighbors: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            neighbor_count: 3,
            min_active_days: 25,
            strict_neighbors: false,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replaces individual fields with any values given on the command line.
    pub fn with_overrides(
        mut self,
        neighbor_count: Option<usize>,
        min_active_days: Option<usize>,
        strict_neighbors: bool,
    ) -> Self {
        if let Some(k) = neighbor_count {
            self.neighbor_count = k;
        }
        if let Some(days) = min_active_days {
            self.min_active_days = days;
        }
        self.strict_neighbors |= strict_neighbors;
        self
    }
}
