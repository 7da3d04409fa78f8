//! Readiness state tracked from backend probes

use crate::backend::BackendClient;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady,
}

/// Last observed readiness. Starts not ready until a probe succeeds.
#[derive(Debug, Default)]
pub struct ReadinessTracker {
    ready: AtomicBool,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Readiness {
        if self.ready.load(Ordering::Relaxed) {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }

    /// Store the new state, returning the previous one
    pub fn record(&self, next: Readiness) -> Readiness {
        let was_ready = self
            .ready
            .swap(next == Readiness::Ready, Ordering::Relaxed);
        if was_ready {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }

    /// Probe the backend and transition accordingly
    pub async fn check(&self, backend: &BackendClient) -> Readiness {
        let outcome = backend.probe().await;
        let next = if outcome.is_ok() {
            Readiness::Ready
        } else {
            Readiness::NotReady
        };
        let previous = self.record(next);

        match outcome {
            Ok(()) if previous != next => {
                info!(backend = %backend.base_url(), "Backend reachable, marking ready")
            }
            Err(e) if previous != next => {
                warn!(backend = %backend.base_url(), error = %e, "Backend unreachable, marking not ready")
            }
            Err(e) => debug!(error = %e, "Backend still unreachable"),
            Ok(()) => {}
        }

        next
    }
}
