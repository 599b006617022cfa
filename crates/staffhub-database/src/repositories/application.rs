//! Leave application repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_entity::leave::{ApplicationStatus, CreateApplication, LeaveApplication};

/// Repository for leave applications.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an application by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LeaveApplication>> {
        sqlx::query_as::<_, LeaveApplication>("SELECT * FROM leave_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find application", e)
            })
    }

    /// Find an application inside the caller's transaction, locked against
    /// a concurrent decision.
    pub async fn find_by_id_locked(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<LeaveApplication>> {
        sqlx::query_as::<_, LeaveApplication>(
            "SELECT * FROM leave_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock application", e))
    }

    /// List applications for a staff member, most recent first.
    pub async fn list_for_staff(
        &self,
        staff_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<LeaveApplication>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leave_applications WHERE staff_id = $1")
                .bind(staff_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count applications", e)
                })?;

        let applications = sqlx::query_as::<_, LeaveApplication>(
            "SELECT * FROM leave_applications WHERE staff_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(staff_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list applications", e))?;

        Ok(PageResponse::new(
            applications,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Pending applications for a staff member, locked inside the caller's
    /// transaction. Used by the termination cascade.
    pub async fn pending_for_staff_locked(
        &self,
        conn: &mut PgConnection,
        staff_id: Uuid,
    ) -> AppResult<Vec<LeaveApplication>> {
        sqlx::query_as::<_, LeaveApplication>(
            "SELECT * FROM leave_applications \
             WHERE staff_id = $1 AND status = 'pending' \
             ORDER BY created_at ASC FOR UPDATE",
        )
        .bind(staff_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to lock pending applications", e)
        })
    }

    /// Insert a newly filed application inside the caller's transaction.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreateApplication,
    ) -> AppResult<LeaveApplication> {
        sqlx::query_as::<_, LeaveApplication>(
            "INSERT INTO leave_applications (id, staff_id, category_id, start_date, \
                                             end_date, total_days, status, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.staff_id)
        .bind(data.category_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.total_days)
        .bind(&data.reason)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create application", e))
    }

    /// Record the decision on an application inside the caller's
    /// transaction. Only a pending row is updated; a terminal row means a
    /// concurrent decision won.
    pub async fn decide(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: ApplicationStatus,
        approver_id: Uuid,
        rejection_reason: Option<&str>,
    ) -> AppResult<LeaveApplication> {
        sqlx::query_as::<_, LeaveApplication>(
            "UPDATE leave_applications SET status = $2, approver_id = $3, \
                                           decided_at = NOW(), rejection_reason = $4, \
                                           updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(approver_id)
        .bind(rejection_reason)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to decide application", e))?
        .ok_or_else(|| AppError::conflict(format!("Application {id} is already decided")))
    }
}
