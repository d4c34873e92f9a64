//! # coastline-api
//!
//! HTTP API layer for CoastlineVibe built on Axum.
//!
//! Every endpoint lives under `/api` and speaks JSON. Handlers stay thin:
//! they extract the caller and the request, call one service, and wrap the
//! result. Failures leave as `{ "error", "message" }` bodies.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
