// src/backends/mod.rs
// Declares backend modules and defines the common display trait.

pub mod clear;
pub mod console;
#[cfg(test)]
pub mod mock;

pub use clear::{ClearStrategy, ScreenClear};
pub use console::ConsoleDriver;

use anyhow::Result;

use crate::frame::FrameGrid;
use crate::projection::Viewport;

/// Fallback size used when the terminal reports zero columns or rows.
pub const DEFAULT_WINDOW_WIDTH_CHARS: u16 = 80;
pub const DEFAULT_WINDOW_HEIGHT_CHARS: u16 = 24;

/// Events a display backend reports between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    /// The visible area changed size.
    Resize(Viewport),
    /// The user asked to quit (key press, EOF on input).
    CloseRequested,
}

/// Defines the interface between the animation loop and a display.
///
/// A driver receives exactly one finished frame per tick. It never sees the
/// pipeline internals, and the pipeline never touches the terminal.
pub trait Driver {
    /// Current size of the drawable area in character cells.
    fn viewport(&self) -> Viewport;

    /// Collects pending events (resize, quit) without blocking.
    fn process_events(&mut self) -> Result<Vec<DriverEvent>>;

    /// Resets the viewport before a frame is drawn.
    fn clear(&mut self) -> Result<()>;

    /// Writes a frame row-major, one grid row per terminal line.
    fn blit(&mut self, frame: &FrameGrid) -> Result<()>;

    /// Flushes everything written since the last call.
    fn present(&mut self) -> Result<()>;

    /// Restores the display to the state it had before the driver started.
    fn cleanup(&mut self) -> Result<()>;
}
