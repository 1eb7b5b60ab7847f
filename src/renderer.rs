// src/renderer.rs

//! This module defines the `Renderer`, the frame pipeline instance.
//!
//! The `Renderer` owns everything needed to turn an [`AngleKey`] into a
//! finished [`FrameGrid`]: the solid's surface (generated once), the
//! trigonometry cache for rotation angles, the projector, the rasterizer with
//! its depth buffer, and the frame cache. It is display-agnostic; handing the
//! frame to a terminal is the `Driver`'s job.
//!
//! Rendering always happens at the key's canonical angles, so for a fixed
//! solid and viewport the frame is a pure function of the key. That is what
//! makes the frame cache transparent.

use std::rc::Rc;

use log::{debug, info, trace};

use crate::angle::AngleKey;
use crate::config::ProjectionConfig;
use crate::frame::FrameGrid;
use crate::frame_cache::FrameCache;
use crate::projection::{Projector, Rotation, Viewport};
use crate::rasterizer::Rasterizer;
use crate::solid::{Solid, Surface};
use crate::trig::TrigCache;

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames computed by running the full pipeline.
    pub frames_rendered: u64,
    /// Frames served from the frame cache.
    pub cache_hits: u64,
    /// Surface points that survived projection and clipping.
    pub fragments_projected: u64,
    /// Fragments that won their cell in the depth test.
    pub fragments_written: u64,
}

/// The rotation → projection → rasterization pipeline for one solid.
#[derive(Debug)]
pub struct Renderer {
    surface: Surface,
    projection: ProjectionConfig,
    projector: Projector,
    trig: TrigCache,
    rasterizer: Rasterizer,
    frame_cache: Option<FrameCache>,
    stats: RenderStats,
}

impl Renderer {
    /// Creates a renderer and generates the solid's surface.
    ///
    /// The parameters are expected to be validated already (see
    /// `Config::validate`); in particular `projection.k2` must exceed the
    /// solid's bounding radius.
    pub fn new(
        solid: Solid,
        projection: ProjectionConfig,
        cache_frames: bool,
        viewport: Viewport,
    ) -> Self {
        let surface = solid.surface();
        info!(
            "Renderer: {} with {} surface points, viewport {}x{}, frame cache {}",
            solid.name(),
            surface.len(),
            viewport.columns,
            viewport.rows,
            if cache_frames { "on" } else { "off" }
        );
        Self {
            projector: Self::projector_for(&solid, &projection, viewport),
            surface,
            projection,
            trig: TrigCache::new(),
            rasterizer: Rasterizer::new(viewport),
            frame_cache: cache_frames.then(|| FrameCache::new(viewport)),
            stats: RenderStats::default(),
        }
    }

    fn projector_for(solid: &Solid, projection: &ProjectionConfig, viewport: Viewport) -> Projector {
        let k1 = if projection.fit_to_viewport {
            Projector::fitted_k1(viewport, projection.k2, solid.bounding_radius())
        } else {
            projection.k1
        };
        Projector::new(k1, projection.k2, viewport)
    }

    pub fn viewport(&self) -> Viewport {
        self.projector.viewport
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Trigonometric values computed (not looked up) so far.
    pub fn trig_misses(&self) -> u64 {
        self.trig.misses()
    }

    /// Number of frames currently memoized, or `None` with caching disabled.
    pub fn cached_frames(&self) -> Option<usize> {
        self.frame_cache.as_ref().map(FrameCache::len)
    }

    /// Adapts the pipeline to a new viewport size.
    ///
    /// Cached frames were captured at the old size and are dropped; the depth
    /// buffer is reallocated and a fitted projection scale is recomputed.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport() {
            return;
        }
        info!(
            "Renderer: viewport resized from {}x{} to {}x{}",
            self.projector.viewport.columns,
            self.projector.viewport.rows,
            viewport.columns,
            viewport.rows
        );
        self.projector = Self::projector_for(self.surface.solid(), &self.projection, viewport);
        self.rasterizer.resize(viewport);
        if let Some(cache) = self.frame_cache.as_mut() {
            cache.invalidate(viewport);
        }
    }

    /// Returns the frame for `key`, from the cache when possible.
    pub fn render(&mut self, key: AngleKey) -> Rc<FrameGrid> {
        if let Some(frame) = self.frame_cache.as_ref().and_then(|cache| cache.lookup(key)) {
            self.stats.cache_hits += 1;
            trace!("Renderer: cache hit for {:?}", key);
            return frame;
        }

        let frame = Rc::new(self.compute_frame(key));
        if let Some(cache) = self.frame_cache.as_mut() {
            cache.store(key, Rc::clone(&frame));
        }
        frame
    }

    /// Runs the full pipeline for `key`, bypassing the frame cache.
    pub fn compute_frame(&mut self, key: AngleKey) -> FrameGrid {
        let rotation = Rotation::from_sin_cos(
            self.trig.sin_cos_bucket(key.a_bucket()),
            self.trig.sin_cos_bucket(key.b_bucket()),
        );

        let projector = &self.projector;
        let mut projected = 0u64;
        let fragments = self
            .surface
            .points()
            .iter()
            .filter_map(|point| projector.project(point, &rotation))
            .inspect(|_| projected += 1);

        let written_before = self.rasterizer.fragments_written();
        let frame = self.rasterizer.resolve(fragments);

        self.stats.frames_rendered += 1;
        self.stats.fragments_projected += projected;
        self.stats.fragments_written += self.rasterizer.fragments_written() - written_before;
        debug!(
            "Renderer: computed frame for {:?} ({} fragments on screen, {} lit cells)",
            key,
            projected,
            frame.lit_cells()
        );
        frame
    }
}

#[cfg(test)]
mod tests;
