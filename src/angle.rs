// src/angle.rs

//! Angle discretization shared by the trigonometry cache and the frame cache.
//!
//! Rotation angles are quantized to hundredths of a radian and wrapped into
//! one full turn `[0, 2π)`. Quantizing makes the set of reachable rotation
//! states finite, which is what lets finished frames be memoized.

use std::f64::consts::TAU;

/// Number of buckets per radian.
pub const BUCKETS_PER_RADIAN: f64 = 100.0;

/// Number of distinct buckets in one full turn (`0.00 ..= 6.28`).
pub const BUCKET_COUNT: usize = (TAU * BUCKETS_PER_RADIAN) as usize + 1;

/// Wraps an angle into `[0, 2π)`, preserving its phase.
pub fn wrap_angle(radians: f64) -> f64 {
    if !radians.is_finite() {
        return 0.0;
    }
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Quantizes an angle into its bucket index after wrapping it into one turn.
pub fn bucket_of(radians: f64) -> u16 {
    let bucket = (wrap_angle(radians) * BUCKETS_PER_RADIAN).round() as usize;
    // The last partial bucket (6.285 .. 2π) cannot be reached after wrapping,
    // but guard against rounding landing one past the end anyway.
    (bucket % BUCKET_COUNT) as u16
}

/// The canonical angle in radians represented by a bucket.
pub fn bucket_radians(bucket: u16) -> f64 {
    f64::from(bucket) / BUCKETS_PER_RADIAN
}

/// A discretized rotation-angle pair `(a, b)`.
///
/// Used as the frame cache lookup key. Two rotation states that land in the
/// same buckets render to the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AngleKey {
    a: u16,
    b: u16,
}

impl AngleKey {
    /// Builds a key from raw angles in radians (any real value).
    pub fn from_radians(a: f64, b: f64) -> Self {
        Self {
            a: bucket_of(a),
            b: bucket_of(b),
        }
    }

    /// Builds a key directly from bucket indices, wrapping them into range.
    pub fn from_buckets(a: u16, b: u16) -> Self {
        let count = BUCKET_COUNT as u16;
        Self {
            a: a % count,
            b: b % count,
        }
    }

    pub fn a_bucket(&self) -> u16 {
        self.a
    }

    pub fn b_bucket(&self) -> u16 {
        self.b
    }

    /// The canonical `(a, b)` angles in radians this key stands for.
    pub fn radians(&self) -> (f64, f64) {
        (bucket_radians(self.a), bucket_radians(self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn bucket_count_covers_one_turn() {
        assert_eq!(BUCKET_COUNT, 629);
        assert!(bucket_radians((BUCKET_COUNT - 1) as u16) < TAU);
    }

    #[test]
    fn wrap_angle_stays_in_one_turn() {
        for raw in [-TAU, -0.5, 0.0, 1.0, TAU, TAU + 0.25, 10.0 * TAU + 3.0, -1e-18] {
            let wrapped = wrap_angle(raw);
            assert!((0.0..TAU).contains(&wrapped), "{raw} wrapped to {wrapped}");
        }
        assert_abs_diff_eq!(wrap_angle(TAU + 0.25), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-0.5), TAU - 0.5, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_angles_wrap_to_zero() {
        assert_eq!(wrap_angle(f64::NAN), 0.0);
        assert_eq!(wrap_angle(f64::INFINITY), 0.0);
    }

    #[test]
    fn accumulated_steps_land_on_exact_buckets() {
        // 0.04 added nine times is 0.36000000000000004 or 0.35999999999999993
        // depending on the order; both must map to bucket 36.
        let mut angle = 0.0;
        for _ in 0..9 {
            angle += 0.04;
        }
        assert_eq!(bucket_of(angle), 36);
        assert_eq!(bucket_of(0.36 - 1e-12), 36);
    }

    #[test]
    fn keys_for_equivalent_angles_are_equal() {
        let k1 = AngleKey::from_radians(0.5, 1.25);
        let k2 = AngleKey::from_radians(0.5 + TAU, 1.25 - TAU);
        assert_eq!(k1, k2);
        let (a, b) = k1.radians();
        assert_abs_diff_eq!(a, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(b, 1.25, epsilon = 1e-12);
    }

    #[test]
    fn from_buckets_wraps_out_of_range_indices() {
        let key = AngleKey::from_buckets(BUCKET_COUNT as u16 + 3, 7);
        assert_eq!(key.a_bucket(), 3);
        assert_eq!(key.b_bucket(), 7);
    }
}
