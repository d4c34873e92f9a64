//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod pagination;

pub use auth::{AuthUser, OptionalAuthUser};
pub use json::{ApiJson, ApiPath, ApiQuery, ValidJson};
pub use pagination::PaginationParams;
