#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, GeneratorConfig};
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = GeneratorConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    command::run(&config)
}

fn log_startup_info(config: &GeneratorConfig) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    } else {
        tracing::debug!(
            datacenter_id = config.datacenter_id,
            worker_id = config.worker_id,
            clock = ?config.clock,
            "Starting"
        );
    }
}
