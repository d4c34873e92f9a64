//! PostgreSQL repository implementations.

mod approval;
mod community;
mod favorite;
mod friend;
mod inquiry;
mod listing;
mod notification;
mod post;
mod profile;
mod sticker;
mod verification;

pub use approval::PgApprovalRepository;
pub use community::{PgAlertRepository, PgCommunityRepository};
pub use favorite::PgFavoriteRepository;
pub use friend::PgFriendRepository;
pub use inquiry::PgInquiryRepository;
pub use listing::{PgMarketItemRepository, PgPropertyRepository};
pub use notification::PgNotificationRepository;
pub use post::PgPostRepository;
pub use profile::PgProfileRepository;
pub use sticker::PgStickerRepository;
pub use verification::PgVerificationRepository;
