// src/config.rs

//! Defines the configuration structures for `torus-term`.
//!
//! Every section can be deserialized from a JSON file; missing fields fall
//! back to the reference values (a torus with R1 = 1 and R2 = 2 seen from
//! K2 = 5 with a projection scale K1 = 30, turning 0.04 rad per frame on both
//! axes). Command-line selectors are applied on top of the file.
//!
//! Nothing here is trusted until [`Config::validate`] has run; the animator
//! builder refuses to construct a driver loop from an unvalidated config.

use std::f64::consts::TAU;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::backends::ClearStrategy;
use crate::error::{ensure_positive, ConfigError};
use crate::solid::Solid;

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration of one animation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// The solid being rendered.
    pub solid: Solid,
    /// Perspective projection constants.
    pub projection: ProjectionConfig,
    /// Rotation speed and pacing.
    pub animation: AnimationConfig,
    /// Terminal output settings.
    pub display: DisplayConfig,
    /// Frame memoization settings.
    pub cache: CacheConfig,
}

// --- Projection Configuration ---

/// Perspective projection constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Screen-to-eye distance; scales projected coordinates.
    pub k1: f64,
    /// Eye-to-object distance added before the perspective divide.
    pub k2: f64,
    /// Derive `k1` from the viewport width instead of using the fixed value,
    /// so the solid spans about three quarters of the screen at any size.
    pub fit_to_viewport: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            k1: 30.0,
            k2: 5.0,
            fit_to_viewport: false,
        }
    }
}

// --- Animation Configuration ---

/// Per-frame rotation increments and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Radians added to angle A each frame, in `[0, 2π)`. 0 freezes the axis.
    pub a_step: f64,
    /// Radians added to angle B each frame, in `[0, 2π)`. 0 freezes the axis.
    pub b_step: f64,
    /// Pause between frames in milliseconds.
    pub frame_delay_ms: u64,
    /// Stop after this many frames. `None` runs until interrupted.
    pub max_frames: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            a_step: 0.04,
            b_step: 0.04,
            frame_delay_ms: 30,
            max_frames: None,
        }
    }
}

// --- Display Configuration ---

/// Terminal output settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    /// How the viewport is reset before each frame.
    pub clear: ClearStrategy,
    /// Fixed number of columns. `None` follows the terminal width.
    pub columns: Option<u16>,
    /// Fixed number of rows. `None` follows the terminal height.
    pub rows: Option<u16>,
}

// --- Cache Configuration ---

/// Frame memoization settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep every finished frame keyed by its rotation angles. Memory grows
    /// with the number of distinct angle pairs visited; see `frame_cache`.
    pub frames: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { frames: true }
    }
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Config: loaded {:?} from {}", config, path.display());
        Ok(config)
    }

    /// Checks every setting the render loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solid.validate()?;

        ensure_positive("projection.k2", self.projection.k2)?;
        if !self.projection.fit_to_viewport {
            ensure_positive("projection.k1", self.projection.k1)?;
        }
        // Rotation keeps every point within the bounding radius of the origin,
        // so z' + K2 stays positive for all angles exactly when K2 exceeds it.
        let radius = self.solid.bounding_radius();
        if self.projection.k2 <= radius {
            return Err(ConfigError::DegenerateProjection {
                k2: self.projection.k2,
                radius,
            });
        }

        ensure_rotation_step('A', self.animation.a_step)?;
        ensure_rotation_step('B', self.animation.b_step)?;

        if let (Some(0), _) | (_, Some(0)) = (self.display.columns, self.display.rows) {
            return Err(ConfigError::EmptyViewport {
                columns: self.display.columns.unwrap_or_default(),
                rows: self.display.rows.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

fn ensure_rotation_step(axis: char, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..TAU).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRotationStep { axis, value })
    }
}
