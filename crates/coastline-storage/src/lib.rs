//! # coastline-storage
//!
//! Bucketed object storage for CoastlineVibe uploads. The `supabase`
//! provider talks to the hosted backend's storage REST API; the `local`
//! provider writes under a directory for development and tests.
//! [`media`] holds the per-kind bucket mapping and upload policies.

pub mod manager;
pub mod media;
pub mod providers;

pub use manager::StorageManager;
pub use media::{MediaKind, UploadFile, UploadPolicy};
