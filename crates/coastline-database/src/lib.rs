//! # coastline-database
//!
//! Data access for CoastlineVibe. Repository traits describe every query
//! the services issue; the `postgres` module implements them against the
//! hosted backend's PostgreSQL database and the `memory` module keeps the
//! same tables in process for development and tests. [`Database`] bundles
//! one implementation of each, selected by `database.provider`.

pub mod connection;
pub mod database;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repository;

pub use connection::DatabasePool;
pub use database::Database;

use coastline_core::error::{AppError, ErrorKind};

/// Map a sqlx failure into a database [`AppError`] with context.
pub(crate) fn query_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, format!("{context}: {e}"), e)
}
