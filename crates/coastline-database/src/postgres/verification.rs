//! Location verification request repository.

use async_trait::async_trait;
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::UserId;
use coastline_entity::verification::VerificationRequest;

use crate::query_error;
use crate::repository::VerificationRepository;

#[derive(Debug, Clone)]
pub struct PgVerificationRepository {
    pool: PgPool,
}

impl PgVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for PgVerificationRepository {
    async fn insert(&self, request: &VerificationRequest) -> AppResult<VerificationRequest> {
        sqlx::query_as::<_, VerificationRequest>(
            "INSERT INTO verification_requests (id, user_id, community_id, street_address, city, \
             postal_code, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.community_id)
        .bind(&request.street_address)
        .bind(&request.city)
        .bind(&request.postal_code)
        .bind(request.status)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert verification request"))
    }

    async fn latest_for(&self, user: UserId) -> AppResult<Option<VerificationRequest>> {
        sqlx::query_as::<_, VerificationRequest>(
            "SELECT * FROM verification_requests WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to load verification request"))
    }

    async fn pending_for(&self, user: UserId) -> AppResult<Option<VerificationRequest>> {
        sqlx::query_as::<_, VerificationRequest>(
            "SELECT * FROM verification_requests WHERE user_id = $1 AND status = 'pending' LIMIT 1",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to load pending verification request"))
    }
}
