// src/frame_cache.rs

//! Memoization of finished frames keyed by discretized rotation angles.
//!
//! Under fixed per-tick increments the rotation state is periodic, so the
//! same [`AngleKey`] comes round again and again. Storing the finished grid
//! turns every revisit into a table lookup.
//!
//! # Memory
//!
//! There is no eviction. The key space is bounded by the angle
//! discretization (`BUCKET_COUNT²` ≈ 396k pairs), and each entry holds one
//! viewport-sized grid, so the worst case is `BUCKET_COUNT² × columns × rows`
//! bytes. In practice the animation only visits the keys on its own orbit
//! (equal increments on both axes keep `a == b`, so at most `BUCKET_COUNT`
//! keys), but unequal increments can visit far more. This is a deliberate
//! trade of memory for recomputation; set `cache.frames = false` to bypass
//! the cache when memory matters more.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, error, info};

use crate::angle::{AngleKey, BUCKET_COUNT};
use crate::frame::FrameGrid;
use crate::projection::Viewport;

/// Angle-keyed store of finished frames for one viewport size.
#[derive(Debug)]
pub struct FrameCache {
    viewport: Viewport,
    frames: HashMap<AngleKey, Rc<FrameGrid>>,
    capacity: usize,
}

impl FrameCache {
    /// Creates an empty cache for frames of the given size.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frames: HashMap::new(),
            capacity: BUCKET_COUNT * BUCKET_COUNT,
        }
    }

    /// Upper bound on the number of entries, fixed by the discretization.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Bytes held by cached glyph data.
    pub fn footprint_bytes(&self) -> usize {
        self.frames.values().map(|f| f.byte_size()).sum()
    }

    /// Returns the cached frame for `key`, if any.
    pub fn lookup(&self, key: AngleKey) -> Option<Rc<FrameGrid>> {
        self.frames.get(&key).cloned()
    }

    /// Stores a finished frame.
    ///
    /// # Panics
    ///
    /// Panics if the frame was not rendered for this cache's viewport; that
    /// would mean a resize was not propagated to the cache.
    pub fn store(&mut self, key: AngleKey, frame: Rc<FrameGrid>) {
        if frame.viewport() != self.viewport {
            error!(
                "FrameCache: frame sized {:?} stored in cache for {:?}. This is a bug in the renderer.",
                frame.viewport(),
                self.viewport
            );
            panic!("FrameCache: frame size does not match cache viewport");
        }
        debug_assert!(self.frames.len() < self.capacity || self.frames.contains_key(&key));
        self.frames.insert(key, frame);
        if self.frames.len() % 1024 == 0 {
            info!(
                "FrameCache: {} frames cached (~{} KiB)",
                self.frames.len(),
                self.footprint_bytes() / 1024
            );
        }
    }

    /// Drops every entry and rebinds the cache to `viewport`.
    pub fn invalidate(&mut self, viewport: Viewport) {
        if !self.frames.is_empty() {
            debug!(
                "FrameCache: invalidating {} frames ({:?} -> {:?})",
                self.frames.len(),
                self.viewport,
                viewport
            );
        }
        self.frames.clear();
        self.viewport = viewport;
    }
}
