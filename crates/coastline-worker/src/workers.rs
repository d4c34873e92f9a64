//! Wiring of the built-in background work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use coastline_core::AppResult;
use coastline_core::config::notifications::NotificationsConfig;
use coastline_core::config::worker::WorkerConfig;
use coastline_database::Database;
use coastline_service::NotificationCenter;

use crate::cron::CronScheduler;
use crate::jobs::{NotificationRetentionTask, PendingApprovalsTask};
use crate::scheduler::{TaskHandle, TaskScheduler};

/// Running background tasks, stopped together at shutdown.
#[derive(Debug)]
pub struct BackgroundWorkers {
    handles: Vec<TaskHandle>,
    cron: Option<CronScheduler>,
}

impl BackgroundWorkers {
    /// Start the approvals poll and the retention schedule.
    pub async fn start(
        worker: &WorkerConfig,
        notifications_config: &NotificationsConfig,
        db: &Database,
        notifications: Arc<NotificationCenter>,
        shutdown: watch::Receiver<bool>,
    ) -> AppResult<Self> {
        if !worker.enabled {
            info!("Background workers disabled");
            return Ok(Self {
                handles: Vec::new(),
                cron: None,
            });
        }

        let scheduler = TaskScheduler::new(shutdown);
        let approvals = Arc::new(PendingApprovalsTask::new(
            db.approvals.clone(),
            db.profiles.clone(),
            Arc::clone(&notifications),
            Duration::from_secs(worker.approval_poll_seconds.max(1)),
        ));
        let handles = vec![scheduler.spawn(approvals)];

        let cron = CronScheduler::new().await?;
        cron.register_retention(
            &notifications_config.retention_cron,
            Arc::new(NotificationRetentionTask::new(
                notifications,
                notifications_config.retention_days,
            )),
        )
        .await?;
        cron.start().await?;

        info!(tasks = handles.len(), "Background workers started");
        Ok(Self {
            handles,
            cron: Some(cron),
        })
    }

    /// Stop every task and the cron scheduler.
    pub async fn shutdown(self) {
        for handle in self.handles {
            handle.stop().await;
        }
        if let Some(cron) = self.cron {
            if let Err(e) = cron.shutdown().await {
                warn!(error = %e, "Cron scheduler did not shut down cleanly");
            }
        }
        info!("Background workers stopped");
    }
}
