//! Feed post and report repository.

use async_trait::async_trait;
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, PageRequest, PageResponse, PostId};
use coastline_entity::post::{Post, PostReport};

use crate::query_error;
use crate::repository::PostRepository;

#[derive(Debug, Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &Post) -> AppResult<Post> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (id, user_id, community_id, type, content, image_files, video_url, \
             file_urls, parent_id, is_pinned, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(post.community_id)
        .bind(post.post_type)
        .bind(&post.content)
        .bind(&post.image_files)
        .bind(&post.video_url)
        .bind(&post.file_urls)
        .bind(post.parent_id)
        .bind(post.is_pinned)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert post"))
    }

    async fn find(&self, id: PostId) -> AppResult<Option<Post>> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find post"))
    }

    async fn list_feed(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE community_id = $1 AND parent_id IS NULL",
        )
        .bind(community)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to count posts"))?;

        let rows = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE community_id = $1 AND parent_id IS NULL \
             ORDER BY is_pinned DESC, created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(community)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list feed"))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn set_pinned(&self, id: PostId, pinned: bool) -> AppResult<Option<Post>> {
        sqlx::query_as::<_, Post>("UPDATE posts SET is_pinned = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(pinned)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to pin post"))
    }

    async fn delete(&self, id: PostId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to begin transaction"))?;

        sqlx::query("DELETE FROM post_reports WHERE post_id = $1 OR post_id IN (SELECT id FROM posts WHERE parent_id = $1)")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to delete post reports"))?;
        sqlx::query("DELETE FROM posts WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to delete comments"))?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to delete post"))?;

        tx.commit()
            .await
            .map_err(query_error("Failed to commit post deletion"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_report(&self, report: &PostReport) -> AppResult<PostReport> {
        sqlx::query_as::<_, PostReport>(
            "INSERT INTO post_reports (id, post_id, reporter_id, community_id, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(report.id)
        .bind(report.post_id)
        .bind(report.reporter_id)
        .bind(report.community_id)
        .bind(&report.reason)
        .bind(report.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert post report"))
    }

    async fn list_reports(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PostReport>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM post_reports WHERE community_id = $1")
                .bind(community)
                .fetch_one(&self.pool)
                .await
                .map_err(query_error("Failed to count post reports"))?;

        let rows = sqlx::query_as::<_, PostReport>(
            "SELECT * FROM post_reports WHERE community_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(community)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list post reports"))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }
}
