// src/solid.rs

//! Parametric solids and their object-space surface samples.
//!
//! A [`Solid`] is a closed set of shapes. Each variant knows how to enumerate
//! its surface as a list of [`SurfacePoint`]s; the rest of the pipeline only
//! ever sees those points, so adding a shape means adding a variant and a
//! `match` arm in [`Solid::surface`].

use std::f64::consts::TAU;

use log::{debug, error};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigError};

pub const DEFAULT_MINOR_RADIUS: f64 = 1.0;
pub const DEFAULT_MAJOR_RADIUS: f64 = 2.0;
pub const DEFAULT_THETA_STEP: f64 = 0.07;
pub const DEFAULT_PHI_STEP: f64 = 0.02;
pub const DEFAULT_CUBE_SIDE: f64 = 3.0;
pub const DEFAULT_CUBE_STEP: f64 = 0.05;

/// Upper bound on the samples one surface may hold. The reference torus uses
/// 28,350 and the reference cube 22,326.
pub const MAX_SURFACE_POINTS: usize = 4_000_000;

/// A single object-space sample of a solid's surface.
///
/// Carries the outward unit normal alongside the position so shading works the
/// same way for every solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl SurfacePoint {
    pub fn new(position: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

/// The shape being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solid {
    /// A torus swept by a cross-section circle (`theta`) revolved about the
    /// vertical axis (`phi`).
    Torus {
        #[serde(default = "default_minor_radius")]
        minor_radius: f64,
        #[serde(default = "default_major_radius")]
        major_radius: f64,
        #[serde(default = "default_theta_step")]
        theta_step: f64,
        #[serde(default = "default_phi_step")]
        phi_step: f64,
    },
    /// An axis-aligned cube centered on the origin, each face sampled on a
    /// regular grid.
    Cube {
        #[serde(default = "default_cube_side")]
        side: f64,
        #[serde(default = "default_cube_step")]
        step: f64,
    },
}

fn default_minor_radius() -> f64 {
    DEFAULT_MINOR_RADIUS
}

fn default_major_radius() -> f64 {
    DEFAULT_MAJOR_RADIUS
}

fn default_theta_step() -> f64 {
    DEFAULT_THETA_STEP
}

fn default_phi_step() -> f64 {
    DEFAULT_PHI_STEP
}

fn default_cube_side() -> f64 {
    DEFAULT_CUBE_SIDE
}

fn default_cube_step() -> f64 {
    DEFAULT_CUBE_STEP
}

impl Default for Solid {
    fn default() -> Self {
        Solid::torus()
    }
}

impl Solid {
    /// The reference torus (R1 = 1, R2 = 2, θ step 0.07, φ step 0.02).
    pub fn torus() -> Self {
        Solid::Torus {
            minor_radius: DEFAULT_MINOR_RADIUS,
            major_radius: DEFAULT_MAJOR_RADIUS,
            theta_step: DEFAULT_THETA_STEP,
            phi_step: DEFAULT_PHI_STEP,
        }
    }

    pub fn cube() -> Self {
        Solid::Cube {
            side: DEFAULT_CUBE_SIDE,
            step: DEFAULT_CUBE_STEP,
        }
    }

    /// Resolves a command-line solid selector.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "donut" | "torus" => Ok(Solid::torus()),
            "cube" => Ok(Solid::cube()),
            _ => Err(ConfigError::UnknownSolid {
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Solid::Torus { .. } => "torus",
            Solid::Cube { .. } => "cube",
        }
    }

    /// Largest distance from the origin to any surface point.
    ///
    /// Rotation preserves distance, so no rotated point can get closer to the
    /// eye than `K2 - bounding_radius`.
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Solid::Torus {
                minor_radius,
                major_radius,
                ..
            } => minor_radius + major_radius,
            Solid::Cube { side, .. } => side * 0.5 * 3f64.sqrt(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Solid::Torus {
                minor_radius,
                major_radius,
                theta_step,
                phi_step,
            } => {
                ensure_positive("solid.minor_radius", minor_radius)?;
                ensure_positive("solid.major_radius", major_radius)?;
                ensure_sweep_step("solid.theta_step", theta_step)?;
                ensure_sweep_step("solid.phi_step", phi_step)?;
            }
            Solid::Cube { side, step } => {
                ensure_positive("solid.side", side)?;
                ensure_positive("solid.step", step)?;
            }
        }
        match self.sample_count() {
            Some(count) if count <= MAX_SURFACE_POINTS => Ok(()),
            _ => Err(ConfigError::TooManySamples {
                solid: self.name(),
                limit: MAX_SURFACE_POINTS,
            }),
        }
    }

    /// Number of surface points [`Solid::surface`] generates, or `None` if it
    /// does not fit in a `usize`.
    pub fn sample_count(&self) -> Option<usize> {
        match *self {
            Solid::Torus {
                theta_step,
                phi_step,
                ..
            } => sweep_count(theta_step).checked_mul(sweep_count(phi_step)),
            Solid::Cube { side, step } => {
                let per_edge = cube_edge_count(side, step)?;
                CUBE_FACE_COUNT.checked_mul(per_edge)?.checked_mul(per_edge)
            }
        }
    }

    /// Enumerates every surface sample of this solid in a fixed order.
    ///
    /// Expects a solid that passed [`Solid::validate`]; a sample count above
    /// [`MAX_SURFACE_POINTS`] is treated as a caller bug.
    pub fn surface(&self) -> Surface {
        if !self.sample_count().is_some_and(|count| count <= MAX_SURFACE_POINTS) {
            error!(
                "Solid: {} surface exceeds {} samples; solid was not validated",
                self.name(),
                MAX_SURFACE_POINTS
            );
            panic!("Solid: surface sample count exceeds MAX_SURFACE_POINTS");
        }
        let points = match *self {
            Solid::Torus {
                minor_radius,
                major_radius,
                theta_step,
                phi_step,
            } => torus_points(minor_radius, major_radius, theta_step, phi_step),
            Solid::Cube { side, step } => cube_points(side, step),
        };
        debug!("Solid: generated {} surface points for {}", points.len(), self.name());
        Surface {
            solid: *self,
            points,
        }
    }
}

fn ensure_sweep_step(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value < TAU {
        Ok(())
    } else {
        Err(ConfigError::InvalidSweepStep { field, value })
    }
}

/// Number of samples taken when sweeping `[0, 2π)` in increments of `step`.
pub fn sweep_count(step: f64) -> usize {
    (TAU / step).ceil() as usize
}

fn torus_points(r1: f64, r2: f64, theta_step: f64, phi_step: f64) -> Vec<SurfacePoint> {
    let theta_count = sweep_count(theta_step);
    let phi_count = sweep_count(phi_step);

    // The revolution angle is swept once per cross-section angle; compute its
    // sines and cosines a single time.
    let phi_trig: Vec<(f64, f64)> = (0..phi_count)
        .map(|i| (i as f64 * phi_step).sin_cos())
        .collect();

    let mut points = Vec::with_capacity(theta_count * phi_count);
    for i in 0..theta_count {
        let (sin_theta, cos_theta) = (i as f64 * theta_step).sin_cos();
        let circle_x = r2 + r1 * cos_theta;
        let circle_y = r1 * sin_theta;

        for &(sin_phi, cos_phi) in &phi_trig {
            let position = Vector3::new(circle_x * cos_phi, circle_y, -circle_x * sin_phi);
            let normal = Vector3::new(cos_theta * cos_phi, sin_theta, -cos_theta * sin_phi);
            points.push(SurfacePoint::new(position, normal));
        }
    }
    points
}

/// Grid samples along one cube edge, corners included.
fn cube_edge_count(side: f64, step: f64) -> Option<usize> {
    // Float-to-int casts saturate, so an absurd ratio lands on usize::MAX.
    ((side / step).ceil() as usize).max(1).checked_add(1)
}

/// Number of faces sampled by [`cube_points`].
const CUBE_FACE_COUNT: usize = 6;

fn cube_points(side: f64, step: f64) -> Vec<SurfacePoint> {
    let half = side * 0.5;
    let per_edge = ((side / step).ceil() as usize).max(1) + 1;
    let spacing = side / (per_edge - 1) as f64;

    // (normal, u axis, v axis) for each face.
    let faces: [(Vector3<f64>, Vector3<f64>, Vector3<f64>); CUBE_FACE_COUNT] = [
        (Vector3::x(), Vector3::y(), Vector3::z()),
        (-Vector3::x(), Vector3::z(), Vector3::y()),
        (Vector3::y(), Vector3::z(), Vector3::x()),
        (-Vector3::y(), Vector3::x(), Vector3::z()),
        (Vector3::z(), Vector3::x(), Vector3::y()),
        (-Vector3::z(), Vector3::y(), Vector3::x()),
    ];

    let mut points = Vec::with_capacity(faces.len() * per_edge * per_edge);
    for (normal, u, v) in faces {
        for i in 0..per_edge {
            let s = -half + i as f64 * spacing;
            for j in 0..per_edge {
                let t = -half + j as f64 * spacing;
                let position = normal * half + u * s + v * t;
                points.push(SurfacePoint::new(position, normal));
            }
        }
    }
    points
}

/// The full, rotation-independent surface of one solid.
#[derive(Debug, Clone)]
pub struct Surface {
    solid: Solid,
    points: Vec<SurfacePoint>,
}

impl Surface {
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn points(&self) -> &[SurfacePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn default_torus_point_count() {
        let surface = Solid::torus().surface();
        let expected = (TAU / 0.07).ceil() as usize * (TAU / 0.02).ceil() as usize;
        assert_eq!(expected, 90 * 315);
        assert_eq!(surface.len(), expected);
    }

    #[test]
    fn torus_points_follow_the_parametrization() {
        let surface = Solid::torus().surface();
        let first = surface.points()[0];
        assert_abs_diff_eq!(first.x(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(first.y(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(first.z(), 0.0, epsilon = 1e-12);

        for p in surface.points() {
            // Distance from the revolution circle equals the minor radius.
            let ring = (p.x() * p.x() + p.z() * p.z()).sqrt();
            let tube = ((ring - 2.0).powi(2) + p.y() * p.y()).sqrt();
            assert_abs_diff_eq!(tube, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(p.normal.norm(), 1.0, epsilon = 1e-9);
            assert!(p.position.norm() <= Solid::torus().bounding_radius() + 1e-9);
        }
    }

    #[test]
    fn cube_points_lie_on_faces_with_outward_normals() {
        let solid = Solid::Cube { side: 2.0, step: 0.5 };
        let surface = solid.surface();
        // 5 samples per edge, 6 faces.
        assert_eq!(surface.len(), 6 * 5 * 5);
        for p in surface.points() {
            assert_abs_diff_eq!(p.position.dot(&p.normal), 1.0, epsilon = 1e-12);
            assert!(p.position.amax() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn solid_names_resolve() {
        assert_eq!(Solid::from_name("donut").unwrap(), Solid::torus());
        assert_eq!(Solid::from_name("TORUS").unwrap(), Solid::torus());
        assert_eq!(Solid::from_name("cube").unwrap(), Solid::cube());
        assert!(matches!(
            Solid::from_name("sphere"),
            Err(ConfigError::UnknownSolid { .. })
        ));
    }

    #[test]
    fn validation_rejects_bad_parameters() {
        let bad_radius = Solid::Torus {
            minor_radius: 0.0,
            major_radius: 2.0,
            theta_step: 0.07,
            phi_step: 0.02,
        };
        assert!(matches!(bad_radius.validate(), Err(ConfigError::NonPositive { .. })));

        let bad_step = Solid::Torus {
            minor_radius: 1.0,
            major_radius: 2.0,
            theta_step: TAU,
            phi_step: 0.02,
        };
        assert!(matches!(bad_step.validate(), Err(ConfigError::InvalidSweepStep { .. })));

        assert!(Solid::cube().validate().is_ok());
    }

    #[test]
    fn sample_count_matches_generated_surface() {
        for solid in [Solid::torus(), Solid::cube()] {
            assert_eq!(solid.sample_count(), Some(solid.surface().len()));
        }
        assert_eq!(Solid::torus().sample_count(), Some(28_350));
        assert_eq!(Solid::cube().sample_count(), Some(22_326));
    }

    #[test]
    fn tiny_steps_are_rejected_before_generation() {
        let overflowing_cube = Solid::Cube {
            side: 3.0,
            step: 1e-10,
        };
        let huge_cube = Solid::Cube {
            side: 3.0,
            step: 0.003,
        };
        let fine_torus = Solid::Torus {
            minor_radius: 1.0,
            major_radius: 2.0,
            theta_step: 1e-9,
            phi_step: 1e-9,
        };
        for solid in [overflowing_cube, huge_cube, fine_torus] {
            assert!(
                matches!(
                    solid.validate(),
                    Err(ConfigError::TooManySamples {
                        limit: MAX_SURFACE_POINTS,
                        ..
                    })
                ),
                "{solid:?} accepted"
            );
        }
        assert_eq!(overflowing_cube.sample_count(), None);
    }

    #[test]
    #[should_panic(expected = "exceeds MAX_SURFACE_POINTS")]
    fn generating_an_unvalidated_oversized_surface_panics() {
        Solid::Cube {
            side: 3.0,
            step: 1e-10,
        }
        .surface();
    }

    #[test]
    fn solid_config_parses_from_json() {
        let json = r#"{"kind":"cube","side":2.5,"step":0.1}"#;
        let solid: Solid = serde_json::from_str(json).unwrap();
        assert_eq!(solid, Solid::Cube { side: 2.5, step: 0.1 });
    }

    #[test]
    fn missing_solid_fields_take_reference_values() {
        let solid: Solid = serde_json::from_str(r#"{"kind":"torus","minor_radius":0.5}"#).unwrap();
        assert_eq!(
            solid,
            Solid::Torus {
                minor_radius: 0.5,
                major_radius: DEFAULT_MAJOR_RADIUS,
                theta_step: DEFAULT_THETA_STEP,
                phi_step: DEFAULT_PHI_STEP,
            }
        );
    }
}
