//! Periodic background tasks for CoastlineVibe.
//!
//! This crate provides:
//! - [`PeriodicTask`] and the [`TaskScheduler`] that runs each task on its
//!   own interval until it is stopped or the process shuts down
//! - the pending-approvals poll that nudges community admins
//! - the cron-driven retention sweep for read notifications

pub mod cron;
pub mod jobs;
pub mod scheduler;
pub mod task;
pub mod workers;

pub use cron::CronScheduler;
pub use scheduler::{TaskHandle, TaskScheduler};
pub use task::PeriodicTask;
pub use workers::BackgroundWorkers;
