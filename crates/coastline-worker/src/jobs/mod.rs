//! Built-in background jobs.

pub mod approvals;
pub mod retention;

pub use approvals::PendingApprovalsTask;
pub use retention::NotificationRetentionTask;
