//! Notification domain entities.

pub mod kind;
pub mod model;

pub use kind::{LinkRule, NotificationKind, Presentation, TargetType};
pub use model::{NewNotification, Notification, NotificationView};
