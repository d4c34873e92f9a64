//! Approval queue queries over the five approval-gated tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, PageRequest, PageResponse, UserId};
use coastline_entity::approval::{
    ApprovalCounts, ApprovalItem, ApprovalKind, ApprovalStatus, DecideResult, Decision,
};

use crate::query_error;
use crate::repository::{ApprovalRepository, PendingTotal};

/// Where a kind's rows live and how they project onto [`ApprovalItem`].
struct Source {
    table: &'static str,
    status: &'static str,
    submitter: &'static str,
    title: &'static str,
    filter: &'static str,
    touch: &'static str,
}

fn source(kind: ApprovalKind) -> Source {
    match kind {
        ApprovalKind::User => Source {
            table: "profiles",
            status: "approval_status",
            submitter: "id",
            title: "username",
            filter: "role = 'resident'",
            touch: "",
        },
        ApprovalKind::Business => Source {
            table: "profiles",
            status: "approval_status",
            submitter: "id",
            title: "COALESCE(business_name, username)",
            filter: "role = 'business'",
            touch: "",
        },
        ApprovalKind::Property => Source {
            table: "properties",
            status: "approval_status",
            submitter: "user_id",
            title: "title",
            filter: "deleted_at IS NULL",
            touch: ", updated_at = NOW()",
        },
        ApprovalKind::MarketItem => Source {
            table: "market_items",
            status: "approval_status",
            submitter: "user_id",
            title: "title",
            filter: "deleted_at IS NULL",
            touch: ", updated_at = NOW()",
        },
        ApprovalKind::Verification => Source {
            table: "verification_requests",
            status: "status",
            submitter: "user_id",
            title: "street_address || ', ' || city",
            filter: "TRUE",
            touch: ", reviewed_at = NOW()",
        },
    }
}

impl Source {
    fn projection(&self) -> String {
        format!(
            "id, community_id, {} AS submitter_id, {} AS title, {} AS status, created_at",
            self.submitter, self.title, self.status
        )
    }
}

#[derive(Debug, FromRow)]
struct ApprovalRow {
    id: Uuid,
    community_id: CommunityId,
    submitter_id: UserId,
    title: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl ApprovalRow {
    fn into_item(self, kind: ApprovalKind) -> AppResult<ApprovalItem> {
        Ok(ApprovalItem {
            id: self.id,
            kind,
            community_id: self.community_id,
            submitter_id: self.submitter_id,
            title: self.title,
            status: ApprovalStatus::from_label(&self.status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgApprovalRepository {
    pool: PgPool,
}

impl PgApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalRepository for PgApprovalRepository {
    async fn list_pending(
        &self,
        community: CommunityId,
        kind: ApprovalKind,
        page: PageRequest,
    ) -> AppResult<PageResponse<ApprovalItem>> {
        let src = source(kind);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE community_id = $1 AND {} = 'pending' AND {}",
            src.table, src.status, src.filter
        ))
        .bind(community)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to count pending items"))?;

        let rows = sqlx::query_as::<_, ApprovalRow>(&format!(
            "SELECT {} FROM {} WHERE community_id = $1 AND {} = 'pending' AND {} \
             ORDER BY created_at ASC LIMIT $2 OFFSET $3",
            src.projection(),
            src.table,
            src.status,
            src.filter
        ))
        .bind(community)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list pending items"))?;

        let items = rows
            .into_iter()
            .map(|row| row.into_item(kind))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn counts(&self, community: CommunityId) -> AppResult<Vec<ApprovalCounts>> {
        let mut all = Vec::with_capacity(ApprovalKind::ALL.len());
        for &kind in ApprovalKind::ALL {
            let src = source(kind);
            let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
                "SELECT {status}, COUNT(*) FROM {table} WHERE community_id = $1 AND {filter} \
                 GROUP BY {status}",
                status = src.status,
                table = src.table,
                filter = src.filter
            ))
            .bind(community)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to count approval statuses"))?;

            let mut counts = ApprovalCounts::empty(kind);
            for (label, n) in rows {
                if let Ok(status) = ApprovalStatus::from_label(&label) {
                    counts.record(status, n as u64);
                }
            }
            all.push(counts);
        }
        Ok(all)
    }

    async fn decide(
        &self,
        community: CommunityId,
        kind: ApprovalKind,
        id: Uuid,
        decision: Decision,
    ) -> AppResult<DecideResult> {
        let src = source(kind);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to begin transaction"))?;

        let updated = sqlx::query_as::<_, ApprovalRow>(&format!(
            "UPDATE {table} SET {status} = $1{touch} \
             WHERE id = $2 AND community_id = $3 AND {status} = 'pending' AND {filter} \
             RETURNING {projection}",
            table = src.table,
            status = src.status,
            touch = src.touch,
            filter = src.filter,
            projection = src.projection()
        ))
        .bind(kind.decided_label(decision))
        .bind(id)
        .bind(community)
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error("Failed to update approval status"))?;

        if let Some(row) = updated {
            let item = row.into_item(kind)?;
            if kind == ApprovalKind::Verification && decision == Decision::Approve {
                sqlx::query("UPDATE profiles SET is_location_verified = TRUE WHERE id = $1")
                    .bind(item.submitter_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(query_error("Failed to update location verification"))?;
            }
            tx.commit()
                .await
                .map_err(query_error("Failed to commit approval decision"))?;
            return Ok(DecideResult::Updated(item));
        }
        drop(tx);

        let current: Option<String> = sqlx::query_scalar(&format!(
            "SELECT {} FROM {} WHERE id = $1 AND community_id = $2 AND {}",
            src.status, src.table, src.filter
        ))
        .bind(id)
        .bind(community)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to read approval status"))?;

        match current {
            Some(label) => Ok(DecideResult::AlreadyDecided(ApprovalStatus::from_label(
                &label,
            )?)),
            None => Ok(DecideResult::NotFound),
        }
    }

    async fn pending_totals(&self) -> AppResult<Vec<PendingTotal>> {
        let mut totals = Vec::new();
        for &kind in ApprovalKind::ALL {
            let src = source(kind);
            let rows: Vec<(CommunityId, i64)> = sqlx::query_as(&format!(
                "SELECT community_id, COUNT(*) FROM {} \
                 WHERE community_id IS NOT NULL AND {} = 'pending' AND {} GROUP BY community_id",
                src.table, src.status, src.filter
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to total pending items"))?;

            totals.extend(rows.into_iter().map(|(community_id, n)| PendingTotal {
                community_id,
                kind,
                pending: n as u64,
            }));
        }
        Ok(totals)
    }
}
