//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::{NotificationId, UserId};
use coastline_entity::notification::{NewNotification, Notification};

use crate::query_error;
use crate::repository::NotificationRepository;

#[derive(Debug, Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        let row = notification.into_notification(NotificationId::new(), Utc::now());
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, recipient_id, kind, actor_id, target_entity_id, \
             target_entity_type, content_snippet, is_read, community_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $9) RETURNING *",
        )
        .bind(row.id)
        .bind(row.recipient_id)
        .bind(row.kind)
        .bind(row.actor_id)
        .bind(row.target_entity_id)
        .bind(row.target_entity_type)
        .bind(&row.content_snippet)
        .bind(row.community_id)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to create notification"))
    }

    async fn latest_for(&self, recipient: UserId, limit: u64) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(recipient)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list notifications"))
    }

    async fn unread_count(&self, recipient: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to count unread notifications"))?;
        Ok(count as u64)
    }

    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2")
                .bind(id)
                .bind(recipient)
                .execute(&self.pool)
                .await
                .map_err(query_error("Failed to mark notification read"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, recipient: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to mark notifications read"))?;
        Ok(result.rows_affected())
    }

    async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE is_read = TRUE AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await
                .map_err(query_error("Failed to purge notifications"))?;
        Ok(result.rows_affected())
    }
}
