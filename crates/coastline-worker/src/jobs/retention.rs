//! Retention sweep for read notifications.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use coastline_core::AppResult;
use coastline_service::NotificationCenter;

pub struct NotificationRetentionTask {
    notifications: Arc<NotificationCenter>,
    retention_days: i64,
}

impl NotificationRetentionTask {
    pub fn new(notifications: Arc<NotificationCenter>, retention_days: i64) -> Self {
        Self {
            notifications,
            retention_days: retention_days.max(1),
        }
    }

    /// Delete read notifications older than the retention window.
    pub async fn run_once(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        let removed = self.notifications.purge_read_before(cutoff).await?;
        info!(removed, retention_days = self.retention_days, "Purged read notifications");
        Ok(removed)
    }
}
