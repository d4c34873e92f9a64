//! Cron scheduler for the daily maintenance jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use coastline_core::AppError;

use crate::jobs::NotificationRetentionTask;

/// Cron-based scheduler for jobs that run at fixed times of day.
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self { scheduler })
    }

    /// Purge read notifications on `schedule` (six-field cron, with seconds).
    pub async fn register_retention(
        &self,
        schedule: &str,
        task: Arc<NotificationRetentionTask>,
    ) -> Result<(), AppError> {
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let task = Arc::clone(&task);
            Box::pin(async move {
                if let Err(e) = task.run_once().await {
                    error!(error = %e, "Notification retention failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid retention schedule '{schedule}': {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add retention schedule: {e}")))?;

        info!(schedule, "Registered: notification_retention");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down scheduler: {e}")))?;
        info!("Cron scheduler shut down");
        Ok(())
    }
}
