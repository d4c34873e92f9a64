//! HTTP request handlers, one module per area.

pub mod approval;
pub mod community;
pub mod feed;
pub mod friend;
pub mod health;
pub mod market;
pub mod media;
pub mod notification;
pub mod profile;
pub mod property;
pub mod sticker;
pub mod translate;
pub mod verification;
