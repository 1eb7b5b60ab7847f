// src/trig.rs

//! Memoized sine/cosine lookups for discretized angles.

use crate::angle::{bucket_of, bucket_radians, BUCKET_COUNT};
use log::{debug, error};

/// Lazily filled `(sin, cos)` table indexed by angle bucket.
///
/// The table is sized once to [`BUCKET_COUNT`] entries and never evicts; the
/// domain is one full turn at a fixed resolution. Values are always computed
/// at the bucket's canonical angle, so a lookup result depends only on the
/// bucket and never on which raw angle first populated it.
#[derive(Debug, Clone)]
pub struct TrigCache {
    table: Vec<Option<(f64, f64)>>,
    misses: u64,
}

impl TrigCache {
    pub fn new() -> Self {
        Self {
            table: vec![None; BUCKET_COUNT],
            misses: 0,
        }
    }

    /// Returns `(sin, cos)` for the bucket containing `radians`.
    pub fn sin_cos(&mut self, radians: f64) -> (f64, f64) {
        self.sin_cos_bucket(bucket_of(radians))
    }

    /// Returns `(sin, cos)` for a bucket index.
    ///
    /// # Panics
    ///
    /// Panics if `bucket` is outside the table. Callers derive buckets from
    /// [`bucket_of`] or an `AngleKey`, so an out-of-range bucket means the
    /// discretization and the table are out of sync.
    pub fn sin_cos_bucket(&mut self, bucket: u16) -> (f64, f64) {
        let index = usize::from(bucket);
        let Some(slot) = self.table.get_mut(index) else {
            error!(
                "TrigCache: bucket {} outside table of {} entries. This is a bug in the caller.",
                bucket, BUCKET_COUNT
            );
            panic!("TrigCache: bucket {bucket} out of range");
        };
        match *slot {
            Some(pair) => pair,
            None => {
                let pair = bucket_radians(bucket).sin_cos();
                *slot = Some(pair);
                self.misses += 1;
                debug!("TrigCache: filled bucket {} ({} misses so far)", bucket, self.misses);
                pair
            }
        }
    }

    /// Number of lookups that had to compute a fresh value.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for TrigCache {
    fn default() -> Self {
        Self::new()
    }
}
