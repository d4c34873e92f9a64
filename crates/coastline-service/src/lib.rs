//! # coastline-service
//!
//! Business logic for CoastlineVibe. Each service owns the repositories it
//! needs, checks the caller against the community policy before touching
//! the store, and reports failures as [`AppError`](coastline_core::AppError).

pub mod approval;
pub mod community;
pub mod context;
pub mod feed;
pub mod friend;
pub mod market;
pub mod media;
pub mod notification;
pub mod profile;
pub mod property;
pub mod session;
pub mod sticker;
pub mod translation;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;

pub use approval::{ApprovalOutcome, ApprovalService};
pub use community::CommunityService;
pub use context::RequestContext;
pub use feed::FeedService;
pub use friend::FriendService;
pub use market::MarketService;
pub use media::{MediaService, UploadedMedia};
pub use notification::{NotificationCenter, NotificationSnapshot};
pub use profile::ProfileService;
pub use property::PropertyService;
pub use session::SessionResolver;
pub use sticker::StickerService;
pub use translation::{TranslationClient, TranslationRequest};
pub use verification::VerificationService;
