// src/backends/clear.rs
//
// Strategies for resetting the terminal viewport between frames.

use std::io::Write;
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CURSOR_HOME: &str = "\x1b[H";

/// Configured way of clearing the viewport before each frame.
///
/// Resolved once at startup into a [`ScreenClear`] behaviour owned by the
/// driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClearStrategy {
    /// Move the cursor home with an escape sequence and overdraw in place.
    #[default]
    Escape,
    /// Run the Windows `cls` command.
    #[serde(alias = "win")]
    Windows,
    /// Run the POSIX `clear` command.
    #[serde(alias = "linux")]
    Posix,
}

impl ClearStrategy {
    /// Resolves a command-line selector.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "escape" => Ok(ClearStrategy::Escape),
            "win" | "windows" => Ok(ClearStrategy::Windows),
            "linux" | "posix" | "unix" => Ok(ClearStrategy::Posix),
            _ => Err(ConfigError::UnknownClearStrategy {
                name: name.to_string(),
            }),
        }
    }

    /// Builds the behaviour for this strategy.
    pub fn into_clearer(self) -> Box<dyn ScreenClear> {
        match self {
            ClearStrategy::Escape => Box::new(EscapeHome),
            ClearStrategy::Windows => Box::new(ShellClear::windows()),
            ClearStrategy::Posix => Box::new(ShellClear::posix()),
        }
    }
}

/// Resets the terminal viewport so the next frame starts at the top-left.
pub trait ScreenClear {
    fn clear(&self, out: &mut dyn Write) -> Result<()>;
}

/// Homes the cursor; the next frame overwrites the previous one in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeHome;

impl ScreenClear for EscapeHome {
    fn clear(&self, out: &mut dyn Write) -> Result<()> {
        out.write_all(CURSOR_HOME.as_bytes())
            .context("EscapeHome: Failed to write cursor-home sequence")?;
        trace!("EscapeHome: cursor homed");
        Ok(())
    }
}

/// Runs an external clear-screen command.
#[derive(Debug, Clone)]
pub struct ShellClear {
    program: &'static str,
    args: &'static [&'static str],
}

impl ShellClear {
    pub fn windows() -> Self {
        Self {
            program: "cmd",
            args: &["/C", "cls"],
        }
    }

    pub fn posix() -> Self {
        Self {
            program: "clear",
            args: &[],
        }
    }
}

impl ScreenClear for ShellClear {
    fn clear(&self, out: &mut dyn Write) -> Result<()> {
        // Anything still buffered must land before the command wipes the screen.
        out.flush()
            .context("ShellClear: Failed to flush output before clearing")?;
        let status = Command::new(self.program)
            .args(self.args)
            .status()
            .with_context(|| format!("ShellClear: Failed to run '{}'", self.program))?;
        if !status.success() {
            bail!("ShellClear: '{}' exited with {}", self.program, status);
        }
        debug!("ShellClear: ran '{}'", self.program);
        Ok(())
    }
}
