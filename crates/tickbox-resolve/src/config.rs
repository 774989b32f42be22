// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resolver configuration: grid geometry and the dynamic push split.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reference grid cell side length.
pub const DEFAULT_CELL_SIZE: f64 = 400.0;
/// Reference quadtree depth limit per cell.
pub const DEFAULT_MAX_DEPTH: u32 = 5;
/// Reference share of a dynamic-vs-dynamic penetration given to each side.
///
/// A tuning value, not a mass ratio. Both shares together stay below 1, so a
/// pushed pair keeps some overlap for the following ticks to work off.
pub const DEFAULT_PUSH_RATIO: f64 = 0.31;
/// Largest accepted `max_depth`.
pub const MAX_TREE_DEPTH: u32 = 16;

/// Error type for resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cell size is zero, negative, or not finite.
    #[error("cell size must be finite and > 0, got {0}")]
    InvalidCellSize(f64),
    /// Tree depth exceeds [`MAX_TREE_DEPTH`].
    #[error("max depth must be <= {max}, got {0}", max = MAX_TREE_DEPTH)]
    InvalidMaxDepth(u32),
    /// Push ratio outside `(0, 1]`.
    #[error("push ratio must be in (0, 1], got {0}")]
    InvalidPushRatio(f64),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Tunables consumed when a resolver is built.
///
/// One config drives both the static and the dynamic grid; the three-pass
/// pipeline assumes both grids share cell size and depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Side length of one grid cell in world units.
    pub cell_size: f64,
    /// Quadtree depth limit inside each cell.
    pub max_depth: u32,
    /// Share of a dynamic pair's penetration applied to each side.
    pub push_ratio: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            push_ratio: DEFAULT_PUSH_RATIO,
        }
    }
}

impl ResolverConfig {
    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if !self.push_ratio.is_finite() || self.push_ratio <= 0.0 || self.push_ratio > 1.0 {
            return Err(ConfigError::InvalidPushRatio(self.push_ratio));
        }
        Ok(())
    }

    /// Parses a JSON config (missing fields take reference values) and
    /// validates it.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
