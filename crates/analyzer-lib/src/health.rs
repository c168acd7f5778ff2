//! Liveness and readiness reporting
//!
//! `/health` is a fixed liveness answer. Readiness is tracked separately so
//! an orchestrator stops routing traffic while the service starts up or
//! drains on shutdown.

use crate::models::{iso_now, HealthStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Liveness status reported by `/health`
pub const STATUS_HEALTHY: &str = "healthy";

/// Build the fixed liveness payload
pub fn health_status(version: &str) -> HealthStatus {
    HealthStatus {
        status: STATUS_HEALTHY.to_string(),
        timestamp: iso_now(),
        version: version.to_string(),
    }
}

/// Readiness response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
enum Phase {
    Starting,
    Serving,
    Draining,
}

/// Shared readiness flag
#[derive(Debug, Clone)]
pub struct ReadinessState {
    phase: Arc<RwLock<Phase>>,
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessState {
    pub fn new() -> Self {
        Self {
            phase: Arc::new(RwLock::new(Phase::Starting)),
        }
    }

    /// Mark the service as accepting traffic
    pub async fn set_ready(&self) {
        *self.phase.write().await = Phase::Serving;
    }

    /// Mark the service as shutting down
    pub async fn set_draining(&self) {
        *self.phase.write().await = Phase::Draining;
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        match *self.phase.read().await {
            Phase::Serving => ReadinessResponse {
                ready: true,
                reason: None,
            },
            Phase::Starting => ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            },
            Phase::Draining => ReadinessResponse {
                ready: false,
                reason: Some("Service shutting down".to_string()),
            },
        }
    }
}
