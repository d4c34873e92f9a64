//! Property inquiry repository.

use async_trait::async_trait;
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::{PageRequest, PageResponse, UserId};
use coastline_entity::inquiry::PropertyInquiry;

use crate::query_error;
use crate::repository::InquiryRepository;

#[derive(Debug, Clone)]
pub struct PgInquiryRepository {
    pool: PgPool,
}

impl PgInquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InquiryRepository for PgInquiryRepository {
    async fn insert(&self, inquiry: &PropertyInquiry) -> AppResult<PropertyInquiry> {
        sqlx::query_as::<_, PropertyInquiry>(
            "INSERT INTO property_inquiries (id, community_id, property_id, seller_id, sender_id, \
             name, email, phone, message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(inquiry.id)
        .bind(inquiry.community_id)
        .bind(inquiry.property_id)
        .bind(inquiry.seller_id)
        .bind(inquiry.sender_id)
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.phone)
        .bind(&inquiry.message)
        .bind(inquiry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert property inquiry"))
    }

    async fn list_for_seller(
        &self,
        seller: UserId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PropertyInquiry>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM property_inquiries WHERE seller_id = $1")
                .bind(seller)
                .fetch_one(&self.pool)
                .await
                .map_err(query_error("Failed to count inquiries"))?;

        let rows = sqlx::query_as::<_, PropertyInquiry>(
            "SELECT * FROM property_inquiries WHERE seller_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(seller)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list inquiries"))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }
}
