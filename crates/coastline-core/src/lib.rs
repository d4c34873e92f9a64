//! # coastline-core
//!
//! Core crate for CoastlineVibe. Contains configuration schemas, typed
//! identifiers, pagination types, the object storage trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other CoastlineVibe crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
