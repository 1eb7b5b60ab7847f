// src/backends/mock.rs

//! In-memory driver used by the animator tests.

use std::collections::VecDeque;

use anyhow::Result;

use crate::backends::{Driver, DriverEvent};
use crate::frame::FrameGrid;
use crate::projection::Viewport;

/// Records every call and replays scripted events, one batch per tick.
#[derive(Debug, Default)]
pub struct MockDriver {
    pub viewport: Viewport,
    pub frames: Vec<FrameGrid>,
    pub clears: usize,
    pub presents: usize,
    pub cleanups: usize,
    scripted: VecDeque<Vec<DriverEvent>>,
}

impl MockDriver {
    pub fn new(viewport: Viewport) -> Self {
        MockDriver {
            viewport,
            ..Default::default()
        }
    }

    /// Queues one batch; each `process_events` call returns the oldest batch.
    pub fn push_events(&mut self, events: Vec<DriverEvent>) {
        self.scripted.push_back(events);
    }
}

impl Driver for MockDriver {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn process_events(&mut self) -> Result<Vec<DriverEvent>> {
        let events = self.scripted.pop_front().unwrap_or_default();
        for event in &events {
            if let DriverEvent::Resize(viewport) = event {
                self.viewport = *viewport;
            }
        }
        Ok(events)
    }

    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn blit(&mut self, frame: &FrameGrid) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.cleanups += 1;
        Ok(())
    }
}
