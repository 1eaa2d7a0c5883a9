//! # Duskblade Engine
//!
//! Headless entry point for Duskblade.
//!
//! This crate ties the gameplay layer to a stand-in host:
//! - Configuration and character data loading
//! - Logging setup
//! - Fixed-timestep session driver

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod data_loader;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
///
/// An optional first argument names the config file to use.
fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .init();

    info!("Duskblade starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let summary = app::run(&config)?;
    info!(
        "Duskblade shutdown complete after {} ticks ({} enemies down)",
        summary.ticks, summary.enemies_killed
    );
    Ok(())
}
