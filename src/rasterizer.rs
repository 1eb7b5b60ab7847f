// src/rasterizer.rs

//! Depth resolution and glyph selection.
//!
//! The `Rasterizer` turns one frame's worth of [`ProjectedFragment`]s into a
//! [`FrameGrid`]. For each cell it keeps the fragment closest to the eye
//! (largest inverse depth) and shades it with a glyph from a fixed
//! brightness ramp.

use log::trace;

use crate::frame::FrameGrid;
use crate::projection::{ProjectedFragment, Viewport};

/// Glyphs ordered from dimmest to brightest.
pub const LUMINANCE_RAMP: &[u8; 12] = b".,-~:;=!*#$@";

/// Scale applied to luminance before rounding to a ramp index.
const LUMINANCE_SCALE: f64 = 8.0;

/// Ramp index for a luminance value, clamped to the ramp.
///
/// Luminance tops out at √2, which would scale to index 11.3; rounding can
/// therefore reach 11 but clamping keeps any input, including non-finite
/// ones, inside the ramp.
pub fn luminance_index(luminance: f64) -> usize {
    let scaled = (luminance * LUMINANCE_SCALE).round();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(LUMINANCE_RAMP.len() - 1)
    }
}

/// Glyph for a luminance value.
pub fn luminance_glyph(luminance: f64) -> u8 {
    LUMINANCE_RAMP[luminance_index(luminance)]
}

/// Per-cell record of the largest inverse depth seen this frame.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    viewport: Viewport,
    ooz: Vec<f64>,
}

impl DepthBuffer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ooz: vec![0.0; viewport.area()],
        }
    }

    /// Forgets every depth; called at the start of each frame.
    pub fn reset(&mut self) {
        self.ooz.fill(0.0);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current inverse depth at a cell, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<f64> {
        self.index(x, y).map(|i| self.ooz[i])
    }

    /// Records `ooz` at a cell if it is strictly closer than what is there.
    ///
    /// Returns whether the cell was updated. Equal depths keep the earlier
    /// fragment.
    pub fn test_and_set(&mut self, x: i32, y: i32, ooz: f64) -> bool {
        match self.index(x, y) {
            Some(i) if ooz > self.ooz[i] => {
                self.ooz[i] = ooz;
                true
            }
            _ => false,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.viewport.contains(x, y) {
            Some(y as usize * self.viewport.width() + x as usize)
        } else {
            None
        }
    }
}

/// Resolves fragments into a finished frame, reusing its depth buffer.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    depth: DepthBuffer,
    fragments_written: u64,
}

impl Rasterizer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            depth: DepthBuffer::new(viewport),
            fragments_written: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.depth.viewport()
    }

    /// Reallocates the depth buffer for a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.depth.viewport() {
            self.depth = DepthBuffer::new(viewport);
        }
    }

    /// Total fragments that won their cell across all frames resolved so far.
    pub fn fragments_written(&self) -> u64 {
        self.fragments_written
    }

    /// Resolves one frame.
    ///
    /// Back-facing fragments (`luminance <= 0`) and fragments outside the
    /// viewport never write. Among the rest, the largest `ooz` per cell wins;
    /// ties keep the first fragment seen.
    pub fn resolve<I>(&mut self, fragments: I) -> FrameGrid
    where
        I: IntoIterator<Item = ProjectedFragment>,
    {
        self.depth.reset();
        let mut frame = FrameGrid::blank(self.depth.viewport());
        let mut written = 0u64;

        for fragment in fragments {
            if fragment.luminance <= 0.0 || fragment.luminance.is_nan() {
                continue;
            }
            if self.depth.test_and_set(fragment.x, fragment.y, fragment.ooz) {
                frame.set(
                    fragment.x as usize,
                    fragment.y as usize,
                    luminance_glyph(fragment.luminance),
                );
                written += 1;
            }
        }

        self.fragments_written += written;
        trace!(
            "Rasterizer: resolved frame with {} depth wins, {} lit cells",
            written,
            frame.lit_cells()
        );
        frame
    }
}
