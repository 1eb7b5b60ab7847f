// src/error.rs

//! Error types for configuration and startup validation.
//!
//! Everything here is detected before the animation loop starts. Runtime I/O
//! failures (terminal writes, termios, signals) travel as `anyhow::Error`
//! instead, with context attached at the call site.

use std::path::PathBuf;

/// Configuration problems reported to the caller before any rendering starts.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// Solid selector not recognized.
    #[error("unknown solid '{name}' (expected one of: donut, torus, cube)")]
    UnknownSolid { name: String },

    /// Clear-strategy selector not recognized.
    #[error("unknown clear strategy '{name}' (expected one of: escape, win, windows, linux, posix)")]
    UnknownClearStrategy { name: String },

    /// Per-tick rotation increment outside `[0, 2π)`.
    #[error("rotation increment for axis {axis} must lie in [0, 2π), got {value}")]
    InvalidRotationStep { axis: char, value: f64 },

    /// A parameter that must be a positive finite number was not.
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// Surface sweep increment that cannot cover one full turn sensibly.
    #[error("{field} must lie in (0, 2π), got {value}")]
    InvalidSweepStep { field: &'static str, value: f64 },

    /// Sampling steps so fine the surface would not fit in memory.
    #[error("{solid} surface needs more than {limit} samples; increase the step size")]
    TooManySamples { solid: &'static str, limit: usize },

    /// Eye distance that lets the perspective denominator reach zero.
    #[error(
        "eye-to-object distance K2 = {k2} must exceed the solid's bounding radius {radius} \
         so the depth denominator can never reach zero"
    )]
    DegenerateProjection { k2: f64, radius: f64 },

    /// Viewport with no cells.
    #[error("viewport must be at least 1x1 cells, got {columns}x{rows}")]
    EmptyViewport { columns: u16, rows: u16 },

    /// Command-line usage problem.
    #[error("{0}")]
    Usage(String),

    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Checks that `value` is a finite number strictly greater than zero.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
