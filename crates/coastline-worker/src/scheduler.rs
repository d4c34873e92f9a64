//! Interval scheduler with per-task and global cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::task::PeriodicTask;

/// Handle to one running task.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the task and wait for its current run to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.join.await {
            warn!(task = self.name, error = %e, "Task ended abnormally");
        }
    }
}

/// Spawns periodic tasks that also stop when the shared shutdown flips.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    shutdown: watch::Receiver<bool>,
}

impl TaskScheduler {
    /// `shutdown` is the process-wide signal; sending `true` stops every task.
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    /// Run `task` on its interval. The first run happens immediately.
    pub fn spawn(&self, task: Arc<dyn PeriodicTask>) -> TaskHandle {
        let name = task.name();
        let (stop, stop_rx) = watch::channel(false);
        let shutdown = self.shutdown.clone();
        let join = tokio::spawn(run_loop(task, stop_rx, shutdown));
        TaskHandle { name, stop, join }
    }
}

async fn run_loop(
    task: Arc<dyn PeriodicTask>,
    mut stop: watch::Receiver<bool>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name = task.name();
    let period = task.interval().max(Duration::from_millis(10));
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(task = name, interval_ms = period.as_millis() as u64, "Periodic task started");

    loop {
        if *stop.borrow() || *shutdown.borrow() {
            break;
        }
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                debug!(task = name, "Periodic task tick");
                if let Err(e) = task.run_once().await {
                    warn!(task = name, error = %e, "Periodic task run failed");
                }
            }
        }
    }
    info!(task = name, "Periodic task stopped");
}
