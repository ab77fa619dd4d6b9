use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Radius of the nearest-node search used to enter or leave the graph.
/// Remote points (open ocean) may legitimately find nothing inside it.
pub const DEFAULT_SEARCH_RADIUS_NM: f64 = 800.0;

/// A graph node this close to the caller's waypoint counts as the same point.
pub const DEFAULT_EXACT_MATCH_TOLERANCE_M: f64 = 100.0;

/// Course deviation beyond which an endpoint-adjacent leg is a dog-leg.
/// Empirical heuristic, not a proven bound.
pub const DEFAULT_DOG_LEG_THRESHOLD_DEG: f64 = 90.0;

/// Expansion budget for one search.
pub const DEFAULT_MAX_EXPANSIONS: usize = 250_000;

/// Tunables for closest-node resolution, the search and the path cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    pub search_radius_nm: f64,
    pub exact_match_tolerance_m: f64,
    pub dog_leg_threshold_deg: f64,
    /// `None` disables the cap.
    pub max_expansions: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            search_radius_nm: DEFAULT_SEARCH_RADIUS_NM,
            exact_match_tolerance_m: DEFAULT_EXACT_MATCH_TOLERANCE_M,
            dog_leg_threshold_deg: DEFAULT_DOG_LEG_THRESHOLD_DEG,
            max_expansions: Some(DEFAULT_MAX_EXPANSIONS),
        }
    }
}

impl RouterConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let config: RouterConfig = serde_json::from_str(&raw).map_err(|err| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "loaded router configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.search_radius_nm.is_finite() && self.search_radius_nm > 0.0) {
            return Err(invalid("search_radius_nm must be a positive number"));
        }
        if !(self.exact_match_tolerance_m.is_finite() && self.exact_match_tolerance_m >= 0.0) {
            return Err(invalid("exact_match_tolerance_m must not be negative"));
        }
        if !(self.dog_leg_threshold_deg > 0.0 && self.dog_leg_threshold_deg <= 180.0) {
            return Err(invalid("dog_leg_threshold_deg must be within (0, 180]"));
        }
        if self.max_expansions == Some(0) {
            return Err(invalid("max_expansions must be at least 1"));
        }
        Ok(())
    }

    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig {
        message: message.to_string(),
    }
}
