// src/animator.rs

//! Drives the animation: owns the rotation state, asks the renderer for one
//! frame per tick and hands it to the display driver.
//!
//! The loop is single-threaded and synchronous. Interrupts and close requests
//! are only observed between ticks, so a frame is either written completely
//! or not at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, trace};

use crate::angle::{wrap_angle, AngleKey};
use crate::backends::{Driver, DriverEvent};
use crate::config::Config;
use crate::error::ConfigError;
use crate::os::signal::INTERRUPTED;
use crate::renderer::{RenderStats, Renderer};

/// Represents the status of the animator after one tick.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AnimatorStatus {
    /// A frame was shown; keep going.
    Running,
    /// Interrupt, close request or frame limit. No frame was drawn this tick.
    Shutdown,
}

/// Validates a [`Config`] and assembles an [`Animator`] around a driver.
pub struct AnimatorBuilder {
    config: Config,
    interrupt: &'static AtomicBool,
}

impl AnimatorBuilder {
    pub fn new(config: Config) -> Self {
        AnimatorBuilder {
            config,
            interrupt: &INTERRUPTED,
        }
    }

    /// Polls `flag` instead of the process-wide signal flag.
    pub fn interrupt_flag(mut self, flag: &'static AtomicBool) -> Self {
        self.interrupt = flag;
        self
    }

    /// Checks the configuration and the driver's viewport, then generates the
    /// surface. Nothing is drawn until [`Animator::tick`] runs.
    pub fn build<D: Driver>(self, driver: D) -> Result<Animator<D>, ConfigError> {
        self.config.validate()?;
        let viewport = driver.viewport();
        if viewport.is_empty() {
            return Err(ConfigError::EmptyViewport {
                columns: viewport.columns,
                rows: viewport.rows,
            });
        }
        let renderer = Renderer::new(
            self.config.solid,
            self.config.projection,
            self.config.cache.frames,
            viewport,
        );
        let animation = self.config.animation;
        Ok(Animator {
            driver,
            renderer,
            interrupt: self.interrupt,
            a: 0.0,
            b: 0.0,
            a_step: animation.a_step,
            b_step: animation.b_step,
            frame_delay: Duration::from_millis(animation.frame_delay_ms),
            max_frames: animation.max_frames,
            frames_shown: 0,
        })
    }
}

/// The two-angle state machine feeding frames to a [`Driver`].
pub struct Animator<D: Driver> {
    driver: D,
    renderer: Renderer,
    interrupt: &'static AtomicBool,
    a: f64,
    b: f64,
    a_step: f64,
    b_step: f64,
    frame_delay: Duration,
    max_frames: Option<u64>,
    frames_shown: u64,
}

impl<D: Driver> Animator<D> {
    /// Current rotation angles, always in `[0, 2π)`.
    pub fn angles(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn process_driver_events(&mut self) -> Result<AnimatorStatus> {
        let events = self
            .driver
            .process_events()
            .context("Animator: Driver error processing events")?;
        for event in events {
            debug!("Animator: Handling DriverEvent: {:?}", event);
            match event {
                DriverEvent::CloseRequested => {
                    info!("Animator: CloseRequested event received. Signaling shutdown.");
                    return Ok(AnimatorStatus::Shutdown);
                }
                DriverEvent::Resize(viewport) => self.renderer.resize(viewport),
            }
        }
        Ok(AnimatorStatus::Running)
    }

    /// Runs one step: check for shutdown, handle driver events, show the
    /// frame for the current angles, then advance both angles.
    pub fn tick(&mut self) -> Result<AnimatorStatus> {
        if self.interrupt.load(Ordering::SeqCst) {
            info!("Animator: Interrupt received. Signaling shutdown.");
            return Ok(AnimatorStatus::Shutdown);
        }
        if self.max_frames.is_some_and(|max| self.frames_shown >= max) {
            info!("Animator: Frame limit of {} reached.", self.frames_shown);
            return Ok(AnimatorStatus::Shutdown);
        }
        if self.process_driver_events()? == AnimatorStatus::Shutdown {
            return Ok(AnimatorStatus::Shutdown);
        }

        let key = AngleKey::from_radians(self.a, self.b);
        let frame = self.renderer.render(key);
        self.driver.clear()?;
        self.driver.blit(&frame)?;
        self.driver.present()?;
        self.frames_shown += 1;
        trace!(
            "Animator: frame {} at A={:.4} B={:.4} ({:?})",
            self.frames_shown,
            self.a,
            self.b,
            key
        );

        self.a = wrap_angle(self.a + self.a_step);
        self.b = wrap_angle(self.b + self.b_step);
        Ok(AnimatorStatus::Running)
    }

    /// Ticks until shutdown, pausing `frame_delay_ms` between frames, then
    /// restores the display. The driver is cleaned up on errors too.
    pub fn run(&mut self) -> Result<RenderStats> {
        info!("Animator: Entering main loop.");
        let outcome = self.run_loop();
        let cleanup = self.driver.cleanup();
        outcome?;
        cleanup.context("Animator: Driver cleanup failed")?;

        let stats = self.renderer.stats();
        info!(
            "Animator: Shut down after {} frames ({} rendered, {} cached, {} trig misses).",
            self.frames_shown,
            stats.frames_rendered,
            stats.cache_hits,
            self.renderer.trig_misses()
        );
        Ok(stats)
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.tick()? == AnimatorStatus::Running {
            if !self.frame_delay.is_zero() {
                thread::sleep(self.frame_delay);
            }
        }
        Ok(())
    }
}
