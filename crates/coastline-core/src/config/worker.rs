//! Background task configuration.

use serde::{Deserialize, Serialize};

/// Periodic task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether periodic tasks run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between pending-approval polls.
    #[serde(default = "default_approval_poll")]
    pub approval_poll_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            approval_poll_seconds: default_approval_poll(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_approval_poll() -> u64 {
    10
}
