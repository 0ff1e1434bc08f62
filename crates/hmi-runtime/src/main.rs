//! # HMI Runtime
//!
//! Runs one HMI session against the in-process simulator until Ctrl+C.
//!
//! ## Environment
//!
//! - `HMI_LOG_LEVEL` / `RUST_LOG`, `HMI_JSON_LOGS`: logging
//! - `HMI_DEFAULT_TIMEOUT_MS`, `HMI_MAX_PENDING_CALLS`: correlation limits
//! - `HMI_HANDSHAKE_INTERFACES`: interfaces probed on OnReady

use anyhow::{Context, Result};
use hmi_runtime::{simulated_session, HmiSimulator, RuntimeConfig};
use hmi_telemetry::init_telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let _telemetry =
        init_telemetry(config.telemetry.clone()).context("Failed to initialise telemetry")?;

    let (session, simulator) = simulated_session(config, HmiSimulator::new())?;

    info!("HMI session is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    for (interface, state) in session.states().snapshot() {
        info!(interface = %interface, state = %state, "Final interface state");
    }

    let stats = session.shutdown().await?;
    simulator.abort();
    info!(
        matched = stats.matched,
        timeouts = stats.timeouts,
        unmatched = stats.unmatched,
        "Shutdown complete"
    );
    Ok(())
}
