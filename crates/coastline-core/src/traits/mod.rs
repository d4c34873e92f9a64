//! Core trait definitions implemented by other crates.

pub mod storage;

pub use storage::{ObjectStorage, StoredObject};
