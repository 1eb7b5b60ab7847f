// src/lib.rs

//! ASCII renderer for rotating solids.
//!
//! A solid's surface is sampled once, then every frame rotates it about two
//! axes, projects it with a perspective divide, resolves visibility with a
//! depth buffer and shades each cell with a luminance ramp. Frames are keyed
//! by their quantized rotation angles and memoized, and a display driver
//! writes them to the terminal.

pub mod angle;
pub mod animator;
pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod frame_cache;
pub mod os;
pub mod projection;
pub mod rasterizer;
pub mod renderer;
pub mod solid;
pub mod trig;

pub use animator::{Animator, AnimatorBuilder, AnimatorStatus};
pub use config::Config;
pub use error::ConfigError;
pub use frame::FrameGrid;
pub use renderer::{RenderStats, Renderer};
pub use solid::Solid;
