// src/cli.rs

//! Command-line parsing.
//!
//! `torus-term [SOLID] [CLEAR] [--config PATH] [--frames N] [--no-cache] [--fit]`

use std::path::PathBuf;

use crate::backends::ClearStrategy;
use crate::config::Config;
use crate::error::ConfigError;
use crate::solid::Solid;

pub const USAGE: &str = "\
Usage: torus-term [SOLID] [CLEAR] [OPTIONS]

Renders a rotating solid as ASCII art until interrupted (q, Esc, Ctrl-C).

Arguments:
  SOLID   donut | torus | cube                 (default: torus)
  CLEAR   escape | win | windows | linux | posix (default: escape)

Options:
  --config PATH   read settings from a JSON file
  --frames N      stop after N frames
  --no-cache      recompute every frame instead of memoizing
  --fit           scale the projection to the terminal width
  -h, --help      print this message";

/// Settings taken from the command line. Anything left `None`/`false` keeps
/// the value from the config file or the built-in default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub solid: Option<Solid>,
    pub clear: Option<ClearStrategy>,
    pub config_path: Option<PathBuf>,
    pub max_frames: Option<u64>,
    pub no_cache: bool,
    pub fit: bool,
    pub help: bool,
}

impl CliOptions {
    /// Parses arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = CliOptions::default();
        let mut positional = 0;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "--no-cache" => options.no_cache = true,
                "--fit" => options.fit = true,
                "--config" => {
                    let path = args.next().ok_or_else(|| missing_value("--config"))?;
                    options.config_path = Some(PathBuf::from(path));
                }
                "--frames" => {
                    let value = args.next().ok_or_else(|| missing_value("--frames"))?;
                    let frames = value.parse::<u64>().map_err(|_| {
                        ConfigError::Usage(format!("--frames expects a frame count, got '{value}'"))
                    })?;
                    options.max_frames = Some(frames);
                }
                flag if flag.starts_with('-') => {
                    return Err(ConfigError::Usage(format!("unknown option '{flag}'")));
                }
                selector => {
                    match positional {
                        0 => options.solid = Some(Solid::from_name(selector)?),
                        1 => options.clear = Some(ClearStrategy::from_name(selector)?),
                        _ => {
                            return Err(ConfigError::Usage(format!(
                                "unexpected argument '{selector}'"
                            )))
                        }
                    }
                    positional += 1;
                }
            }
        }
        Ok(options)
    }

    /// Loads the config file (if any) and layers these options on top.
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config_path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(solid) = self.solid {
            config.solid = solid;
        }
        if let Some(clear) = self.clear {
            config.display.clear = clear;
        }
        if self.max_frames.is_some() {
            config.animation.max_frames = self.max_frames;
        }
        if self.no_cache {
            config.cache.frames = false;
        }
        if self.fit {
            config.projection.fit_to_viewport = true;
        }
    }
}

fn missing_value(flag: &str) -> ConfigError {
    ConfigError::Usage(format!("{flag} expects a value"))
}
