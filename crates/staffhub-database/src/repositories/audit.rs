//! Audit log repository implementation.
//!
//! The audit table is append-only. Failure to append is an integrity
//! fault: it aborts the surrounding transaction instead of being logged
//! and dropped.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_entity::audit::{AuditAction, AuditEntry, CreateAuditEntry};

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit entry inside the caller's transaction.
    pub async fn append(
        &self,
        conn: &mut PgConnection,
        data: &CreateAuditEntry,
    ) -> AppResult<AuditEntry> {
        sqlx::query_as::<_, AuditEntry>(
            "INSERT INTO audit_log (id, table_name, record_id, action, \
                                    old_values, new_values, actor_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.table_name)
        .bind(data.record_id)
        .bind(data.action)
        .bind(&data.old_values)
        .bind(&data.new_values)
        .bind(data.actor_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Integrity, "Failed to append audit entry", e)
        })
    }

    /// Find an audit entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AuditEntry>> {
        sqlx::query_as::<_, AuditEntry>("SELECT * FROM audit_log WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find audit entry", e)
            })
    }

    /// All entries for one record, in commit order.
    pub async fn find_for_record(
        &self,
        table_name: &str,
        record_id: Uuid,
    ) -> AppResult<Vec<AuditEntry>> {
        sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM audit_log WHERE table_name = $1 AND record_id = $2 \
             ORDER BY created_at ASC, seq ASC",
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find audit entries", e)
        })
    }

    /// Search the audit log with optional filters.
    pub async fn search(
        &self,
        actor_id: Option<Uuid>,
        table_name: Option<&str>,
        action: Option<AuditAction>,
        since: Option<DateTime<Utc>>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if actor_id.is_some() {
            conditions.push(format!("actor_id = ${param_idx}"));
            param_idx += 1;
        }
        if table_name.is_some() {
            conditions.push(format!("table_name = ${param_idx}"));
            param_idx += 1;
        }
        if action.is_some() {
            conditions.push(format!("action = ${param_idx}"));
            param_idx += 1;
        }
        if since.is_some() {
            conditions.push(format!("created_at >= ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM audit_log {where_clause}");
        let select_sql = format!(
            "SELECT * FROM audit_log {where_clause} \
             ORDER BY created_at DESC, seq DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AuditEntry>(&select_sql);

        if let Some(aid) = actor_id {
            count_query = count_query.bind(aid);
            select_query = select_query.bind(aid);
        }
        if let Some(t) = table_name {
            count_query = count_query.bind(t.to_string());
            select_query = select_query.bind(t.to_string());
        }
        if let Some(a) = action {
            count_query = count_query.bind(a);
            select_query = select_query.bind(a);
        }
        if let Some(s) = since {
            count_query = count_query.bind(s);
            select_query = select_query.bind(s);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
            })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Count audit entries since a specific time.
    pub async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count recent audit entries", e)
            })
    }
}
