//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use coastline_core::types::{CommunityId, NotificationId, UserId};

use super::kind::{NotificationKind, TargetType};

/// Longest snippet stored on a notification, in characters.
pub const SNIPPET_MAX_CHARS: usize = 100;

/// A notification row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    /// The profile whose action triggered the notification.
    pub actor_id: Option<UserId>,
    pub target_entity_id: Option<Uuid>,
    pub target_entity_type: Option<TargetType>,
    /// Truncated excerpt of the triggering content.
    pub content_snippet: Option<String>,
    pub is_read: bool,
    pub community_id: Option<CommunityId>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Render with the kind's presentation row.
    pub fn render(self, actor_name: Option<&str>) -> NotificationView {
        let presentation = self.kind.presentation();
        let link = presentation.link.build(
            self.target_entity_type,
            self.target_entity_id,
            self.community_id,
        );
        let message = presentation.message(actor_name, self.content_snippet.as_deref());
        NotificationView {
            icon: presentation.icon,
            message,
            link,
            notification: self,
        }
    }
}

/// A notification with its rendered icon, message, and link.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub icon: &'static str,
    pub message: String,
    pub link: String,
}

/// Data for inserting a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub actor_id: Option<UserId>,
    pub target_entity_id: Option<Uuid>,
    pub target_entity_type: Option<TargetType>,
    pub content_snippet: Option<String>,
    pub community_id: Option<CommunityId>,
}

impl NewNotification {
    pub fn new(recipient_id: UserId, kind: NotificationKind) -> Self {
        Self {
            recipient_id,
            kind,
            actor_id: None,
            target_entity_id: None,
            target_entity_type: None,
            content_snippet: None,
            community_id: None,
        }
    }

    pub fn actor(mut self, actor_id: UserId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn target(mut self, target_type: TargetType, id: impl Into<Uuid>) -> Self {
        self.target_entity_type = Some(target_type);
        self.target_entity_id = Some(id.into());
        self
    }

    pub fn community(mut self, community_id: CommunityId) -> Self {
        self.community_id = Some(community_id);
        self
    }

    /// Attach a snippet, truncated to [`SNIPPET_MAX_CHARS`] with an ellipsis.
    pub fn snippet(mut self, text: &str) -> Self {
        self.content_snippet = Some(truncate_snippet(text));
        self
    }

    /// Materialize the row as it will be stored.
    pub fn into_notification(self, id: NotificationId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            recipient_id: self.recipient_id,
            kind: self.kind,
            actor_id: self.actor_id,
            target_entity_id: self.target_entity_id,
            target_entity_type: self.target_entity_type,
            content_snippet: self.content_snippet,
            is_read: false,
            community_id: self.community_id,
            created_at,
        }
    }
}

fn truncate_snippet(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(SNIPPET_MAX_CHARS - 1).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncation() {
        let short = NewNotification::new(UserId::new(), NotificationKind::Comment).snippet("  hi ");
        assert_eq!(short.content_snippet.as_deref(), Some("hi"));

        let long_text = "a".repeat(250);
        let long = NewNotification::new(UserId::new(), NotificationKind::Comment).snippet(&long_text);
        let snippet = long.content_snippet.unwrap();
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS);
        assert!(snippet.ends_with('…'));
    }

    #[test]
    fn test_render_uses_table() {
        let property = Uuid::now_v7();
        let row = NewNotification::new(UserId::new(), NotificationKind::ListingApproved)
            .target(TargetType::Property, property)
            .snippet("Harbour loft")
            .into_notification(NotificationId::new(), Utc::now());

        let view = row.render(None);
        assert_eq!(view.icon, "check-circle");
        assert_eq!(view.message, "Your listing \"Harbour loft\" was approved");
        assert_eq!(view.link, format!("/properties/{property}"));
        assert!(!view.notification.is_read);
    }
}
