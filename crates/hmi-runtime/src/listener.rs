//! Starts readiness handshakes when the HMI announces it is up.

use hmi_02_correlation::{CommandContext, EventListener};
use hmi_03_readiness::ReadinessHandshake;
use hmi_telemetry::{log_event, log_interface_event};
use shared_types::{Event, HmiInterface};
use std::sync::atomic::{AtomicU64, Ordering};

const COMPONENT: &str = "on-ready";

/// Listener for `BasicCommunication.OnReady`.
///
/// Every announcement probes each configured interface again, so an HMI
/// that restarts is re-handshaked.
pub struct OnReadyListener {
    interfaces: Vec<HmiInterface>,
    rounds: AtomicU64,
}

impl OnReadyListener {
    pub fn new(interfaces: Vec<HmiInterface>) -> Self {
        Self {
            interfaces,
            rounds: AtomicU64::new(0),
        }
    }

    /// Number of OnReady announcements handled.
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }
}

impl EventListener for OnReadyListener {
    fn on_broadcast(&self, _event: &Event, ctx: &CommandContext) {
        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
        log_event!(
            info,
            COMPONENT,
            "HMI ready, starting readiness handshakes",
            round = round,
            interfaces = self.interfaces.len()
        );

        for interface in &self.interfaces {
            match ReadinessHandshake::new(*interface) {
                Ok(handshake) => ctx.submit(Box::new(handshake)),
                Err(e) => log_interface_event!(
                    warn,
                    COMPONENT,
                    "Interface skipped",
                    interface,
                    error = %e
                ),
            }
        }
    }
}
