//! Notification center configuration.

use serde::{Deserialize, Serialize};

/// Snapshot caching and retention for notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Number of most recent notifications kept in a user's snapshot.
    #[serde(default = "default_snapshot_size")]
    pub snapshot_size: u64,
    /// Snapshot cache time-to-live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached snapshots.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Read notifications older than this are purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Cron expression (with seconds) for the retention sweep.
    #[serde(default = "default_retention_cron")]
    pub retention_cron: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            snapshot_size: default_snapshot_size(),
            cache_ttl_seconds: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            retention_days: default_retention_days(),
            retention_cron: default_retention_cron(),
        }
    }
}

fn default_snapshot_size() -> u64 {
    50
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_retention_days() -> i64 {
    90
}

fn default_retention_cron() -> String {
    "0 0 3 * * *".to_string()
}
