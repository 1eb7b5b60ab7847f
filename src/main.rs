// src/main.rs

use torus_term::{
    backends::ConsoleDriver,
    cli::{CliOptions, USAGE},
    os::signal::install_interrupt_handler,
    AnimatorBuilder, ConfigError,
};

use anyhow::Context;
use log::{error, info};

/// Exit status for configuration and usage errors.
const EXIT_CONFIG_ERROR: i32 = 2;

/// Main entry point for the `torus-term` application.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "warn" if RUST_LOG is not set:
    // stderr shares the terminal with the animation.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => exit_with_config_error(e),
    };
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    // Validate before touching the terminal so errors print on a sane screen.
    let config = match options.resolve_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with_config_error(e),
    };
    info!("Starting torus-term with {:?}", config);

    install_interrupt_handler().context("Failed to install interrupt handlers")?;

    let driver = ConsoleDriver::new(
        config.display.clear,
        config.display.columns,
        config.display.rows,
    )
    .context("Failed to initialize ConsoleDriver")?;

    let mut animator = match AnimatorBuilder::new(config).build(driver) {
        Ok(animator) => animator,
        Err(e) => exit_with_config_error(e),
    };
    let stats = animator.run().context("Animation loop failed")?;
    info!("torus-term exited cleanly: {:?}", stats);
    Ok(())
}

fn exit_with_config_error(e: ConfigError) -> ! {
    error!("Configuration error: {}", e);
    eprintln!("torus-term: {e}\n\n{USAGE}");
    std::process::exit(EXIT_CONFIG_ERROR);
}
