//! Notification kinds and their presentation table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coastline_core::types::CommunityId;

/// Closed set of notification kinds.
///
/// Rows written by older clients may carry kinds outside this set; they
/// decode as [`NotificationKind::System`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Reply,
    Mention,
    FriendRequest,
    FriendAccept,
    PropertyInquiry,
    ListingApproved,
    ListingDeclined,
    AccountApproved,
    AccountDeclined,
    VerificationApproved,
    VerificationRejected,
    PostPinned,
    PostReported,
    CommunityAlert,
    PendingApprovals,
    #[serde(other)]
    System,
}

text_enum!(NotificationKind {
    Like => "like",
    Comment => "comment",
    Reply => "reply",
    Mention => "mention",
    FriendRequest => "friend_request",
    FriendAccept => "friend_accept",
    PropertyInquiry => "property_inquiry",
    ListingApproved => "listing_approved",
    ListingDeclined => "listing_declined",
    AccountApproved => "account_approved",
    AccountDeclined => "account_declined",
    VerificationApproved => "verification_approved",
    VerificationRejected => "verification_rejected",
    PostPinned => "post_pinned",
    PostReported => "post_reported",
    CommunityAlert => "community_alert",
    PendingApprovals => "pending_approvals",
    System => "system",
});

impl NotificationKind {
    /// Parse a stored kind, falling back to `System` for unknown values.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(Self::System)
    }

    /// Presentation row for this kind.
    pub fn presentation(&self) -> Presentation {
        use LinkRule::*;
        let (icon, template, link) = match self {
            Self::Like => ("heart", "{actor} liked your post", Target),
            Self::Comment => ("message-circle", "{actor} commented: {snippet}", Target),
            Self::Reply => ("corner-down-right", "{actor} replied: {snippet}", Target),
            Self::Mention => ("at-sign", "{actor} mentioned you: {snippet}", Target),
            Self::FriendRequest => ("user-plus", "{actor} sent you a friend request", Friends),
            Self::FriendAccept => ("user-check", "{actor} accepted your friend request", Friends),
            Self::PropertyInquiry => ("home", "New inquiry from {actor}: {snippet}", Target),
            Self::ListingApproved => ("check-circle", "Your listing \"{snippet}\" was approved", Target),
            Self::ListingDeclined => ("x-circle", "Your listing \"{snippet}\" was declined", Target),
            Self::AccountApproved => ("badge-check", "Your account has been approved", Feed),
            Self::AccountDeclined => ("user-x", "Your account request was declined", Feed),
            Self::VerificationApproved => ("map-pin", "Your address has been verified", Verification),
            Self::VerificationRejected => ("map-pin-off", "Your address verification was rejected", Verification),
            Self::PostPinned => ("pin", "An admin pinned your post", Target),
            Self::PostReported => ("flag", "A post was reported: {snippet}", Admin),
            Self::CommunityAlert => ("alert-triangle", "Community alert: {snippet}", Alerts),
            Self::PendingApprovals => ("inbox", "{snippet} waiting for review", Admin),
            Self::System => ("bell", "{snippet}", Inbox),
        };
        Presentation {
            icon,
            template,
            link,
        }
    }
}

/// Icon, message template, and link rule for one notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub icon: &'static str,
    /// Template with `{actor}` and `{snippet}` placeholders.
    pub template: &'static str,
    pub link: LinkRule,
}

impl Presentation {
    /// Fill the template's placeholders.
    pub fn message(&self, actor: Option<&str>, snippet: Option<&str>) -> String {
        self.template
            .replace("{actor}", actor.unwrap_or("Someone"))
            .replace("{snippet}", snippet.unwrap_or(""))
            .trim()
            .to_string()
    }
}

/// How to build the in-app link for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// Link to the target entity.
    Target,
    /// The community's admin dashboard.
    Admin,
    /// The community's alert board.
    Alerts,
    /// The community feed.
    Feed,
    Friends,
    Verification,
    /// The notification list itself.
    Inbox,
}

impl LinkRule {
    /// Build the link; falls back to the inbox when required ids are missing.
    pub fn build(
        &self,
        target_type: Option<TargetType>,
        target_id: Option<Uuid>,
        community_id: Option<CommunityId>,
    ) -> String {
        match (self, target_type, target_id, community_id) {
            (Self::Target, Some(kind), Some(id), community) => kind.link(id, community),
            (Self::Admin, _, _, Some(c)) => format!("/community/{c}/admin"),
            (Self::Alerts, _, _, Some(c)) => format!("/community/{c}/alerts"),
            (Self::Feed, _, _, Some(c)) => format!("/community/{c}/feed"),
            (Self::Friends, ..) => "/friends".to_string(),
            (Self::Verification, ..) => "/profile/verification".to_string(),
            _ => "/notifications".to_string(),
        }
    }
}

/// Entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Property,
    MarketItem,
    Post,
    Profile,
    FriendRequest,
    Verification,
    Community,
    Sticker,
    Inquiry,
}

text_enum!(TargetType {
    Property => "property",
    MarketItem => "market_item",
    Post => "post",
    Profile => "profile",
    FriendRequest => "friend_request",
    Verification => "verification",
    Community => "community",
    Sticker => "sticker",
    Inquiry => "inquiry",
});

impl TargetType {
    fn link(&self, id: Uuid, community: Option<CommunityId>) -> String {
        match (self, community) {
            (Self::Property, _) => format!("/properties/{id}"),
            (Self::MarketItem, _) => format!("/market/{id}"),
            (Self::Post, Some(c)) => format!("/community/{c}/feed?post={id}"),
            (Self::Post, None) => format!("/posts/{id}"),
            (Self::Profile, _) => format!("/profile/{id}"),
            (Self::FriendRequest, _) => "/friends".to_string(),
            (Self::Verification, _) => "/profile/verification".to_string(),
            (Self::Community, _) => format!("/community/{id}"),
            (Self::Sticker, Some(c)) => format!("/community/{c}/stickers"),
            (Self::Sticker, None) => "/notifications".to_string(),
            (Self::Inquiry, _) => "/properties/mine".to_string(),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for NotificationKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for NotificationKind {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for NotificationKind {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_stored(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_maps_to_system() {
        assert_eq!(NotificationKind::from_stored("wave"), NotificationKind::System);
        assert_eq!(
            NotificationKind::from_stored("friend_request"),
            NotificationKind::FriendRequest
        );
        let parsed: NotificationKind = serde_json::from_str("\"wave\"").unwrap();
        assert_eq!(parsed, NotificationKind::System);
    }

    #[test]
    fn test_every_kind_has_an_icon_and_template() {
        for kind in NotificationKind::ALL {
            let row = kind.presentation();
            assert!(!row.icon.is_empty(), "{kind} has no icon");
            assert!(!row.template.is_empty(), "{kind} has no template");
        }
    }

    #[test]
    fn test_message_template() {
        let row = NotificationKind::Comment.presentation();
        assert_eq!(
            row.message(Some("maria"), Some("Lovely view!")),
            "maria commented: Lovely view!"
        );
        let row = NotificationKind::Like.presentation();
        assert_eq!(row.message(None, None), "Someone liked your post");
    }

    #[test]
    fn test_link_builder() {
        let id = Uuid::nil();
        let community = CommunityId::from_uuid(Uuid::nil());
        assert_eq!(
            LinkRule::Target.build(Some(TargetType::Property), Some(id), None),
            format!("/properties/{id}")
        );
        assert_eq!(
            LinkRule::Admin.build(None, None, Some(community)),
            format!("/community/{community}/admin")
        );
        assert_eq!(LinkRule::Admin.build(None, None, None), "/notifications");
        assert_eq!(LinkRule::Friends.build(None, None, None), "/friends");
    }
}
