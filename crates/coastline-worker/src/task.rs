//! The periodic task abstraction.

use std::time::Duration;

use async_trait::async_trait;

use coastline_core::AppResult;

/// Work repeated on a fixed interval.
#[async_trait]
pub trait PeriodicTask: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    /// One run. Errors are logged and the next tick proceeds.
    async fn run_once(&self) -> AppResult<()>;
}
