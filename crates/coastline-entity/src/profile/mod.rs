//! Profile domain entities.

pub mod model;
pub mod role;

pub use model::{Profile, ProfileUpdate};
pub use role::ProfileRole;
