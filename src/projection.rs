// src/projection.rs

//! Rotation, perspective projection and shading of surface points.
//!
//! The rotation composes a turn of `A` about the horizontal axis with a turn
//! of `B` about the viewing axis. It is written out as the closed-form
//! two-axis product rather than as a general matrix so each coordinate costs
//! a handful of multiplies. For the torus this reproduces the familiar
//! expanded form
//!
//! ```text
//! x' = circlex·(cosB·cosφ + sinA·sinB·sinφ) − circley·cosA·sinB
//! y' = circlex·(cosφ·sinB − cosB·sinA·sinφ) + circley·cosA·cosB
//! z' = cosA·circlex·sinφ + circley·sinA
//! ```
//!
//! and the luminance is the rotated normal dotted with a fixed light
//! direction `(0, 1, −1)`, giving values in `[−√2, √2]`.

use nalgebra::Vector3;

use crate::solid::SurfacePoint;

/// Eye depths at or below this are treated as degenerate and dropped.
pub const MIN_EYE_DEPTH: f64 = 1e-9;

/// Size of the character grid being rendered into, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    pub columns: u16,
    pub rows: u16,
}

impl Viewport {
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    pub fn width(&self) -> usize {
        usize::from(self.columns)
    }

    pub fn height(&self) -> usize {
        usize::from(self.rows)
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// Whether signed cell coordinates fall inside the grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }
}

/// Light direction baked into the shading term. Not normalized: its length
/// is √2, which is where the `[−√2, √2]` luminance range comes from.
pub fn light_direction() -> Vector3<f64> {
    Vector3::new(0.0, 1.0, -1.0)
}

/// Precomputed sines and cosines of the two rotation angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub sin_a: f64,
    pub cos_a: f64,
    pub sin_b: f64,
    pub cos_b: f64,
}

impl Rotation {
    /// Builds a rotation from `(sin, cos)` pairs for each axis.
    pub fn from_sin_cos((sin_a, cos_a): (f64, f64), (sin_b, cos_b): (f64, f64)) -> Self {
        Self {
            sin_a,
            cos_a,
            sin_b,
            cos_b,
        }
    }

    pub fn from_angles(a: f64, b: f64) -> Self {
        Self::from_sin_cos(a.sin_cos(), b.sin_cos())
    }

    /// Applies the two-axis rotation to an object-space vector.
    pub fn apply(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let Rotation {
            sin_a,
            cos_a,
            sin_b,
            cos_b,
        } = *self;
        Vector3::new(
            v.x * cos_b - v.y * cos_a * sin_b - v.z * sin_a * sin_b,
            v.x * sin_b + v.y * cos_a * cos_b + v.z * sin_a * cos_b,
            v.y * sin_a - v.z * cos_a,
        )
    }
}

/// One projected surface sample, ready for depth resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedFragment {
    pub x: i32,
    pub y: i32,
    /// Inverse eye depth, `1 / z_eye`. Larger is closer.
    pub ooz: f64,
    pub luminance: f64,
}

/// Perspective projector for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    /// Screen-to-eye distance (projection scale).
    pub k1: f64,
    /// Eye-to-object distance added before the perspective divide.
    pub k2: f64,
    pub viewport: Viewport,
}

impl Projector {
    pub fn new(k1: f64, k2: f64, viewport: Viewport) -> Self {
        Self { k1, k2, viewport }
    }

    /// Projection scale that puts a solid of `radius` about three eighths of
    /// the viewport width away from the center.
    pub fn fitted_k1(viewport: Viewport, k2: f64, radius: f64) -> f64 {
        viewport.width() as f64 * k2 * 3.0 / (8.0 * radius)
    }

    /// Rotates, projects and shades one surface point.
    ///
    /// Returns `None` when the point lands outside the viewport or when its
    /// eye depth is not strictly positive.
    pub fn project(&self, point: &SurfacePoint, rotation: &Rotation) -> Option<ProjectedFragment> {
        let rotated = rotation.apply(&point.position);
        let z_eye = rotated.z + self.k2;
        if z_eye <= MIN_EYE_DEPTH {
            // Startup validation keeps K2 beyond the bounding radius, so this
            // only triggers for hand-built projectors.
            return None;
        }
        let ooz = 1.0 / z_eye;

        let half_w = self.viewport.width() as f64 / 2.0;
        let half_h = self.viewport.height() as f64 / 2.0;
        // Terminal cells are about twice as tall as wide, hence the halving.
        let x = (half_w + self.k1 * rotated.x * ooz).round();
        let y = (half_h - self.k1 * rotated.y * ooz / 2.0).round();
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (x, y) = (x as i32, y as i32);
        if !self.viewport.contains(x, y) {
            return None;
        }

        let luminance = rotation.apply(&point.normal).dot(&light_direction());
        Some(ProjectedFragment {
            x,
            y,
            ooz,
            luminance,
        })
    }
}
