//! Assignment ledger repository implementation.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_entity::assignment::{Assignment, CreateAssignment};

/// Repository for assignment history records.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the current assignment for a staff member. O(1) through the
    /// partial unique index on `is_current`.
    pub async fn current_for_staff(&self, staff_id: Uuid) -> AppResult<Option<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM staff_assignments WHERE staff_id = $1 AND is_current",
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find current assignment", e)
        })
    }

    /// Find the current assignment inside the caller's transaction,
    /// locking it against concurrent closure.
    pub async fn current_for_staff_locked(
        &self,
        conn: &mut PgConnection,
        staff_id: Uuid,
    ) -> AppResult<Option<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM staff_assignments WHERE staff_id = $1 AND is_current FOR UPDATE",
        )
        .bind(staff_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to lock current assignment", e)
        })
    }

    /// Placement history for a staff member, ordered by start date
    /// ascending. Stable (start_date, id) ordering makes pages restartable.
    pub async fn history(
        &self,
        staff_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Assignment>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM staff_assignments WHERE staff_id = $1")
                .bind(staff_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count assignments", e)
                })?;

        let assignments = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM staff_assignments WHERE staff_id = $1 \
             ORDER BY start_date ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(staff_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list assignment history", e)
        })?;

        Ok(PageResponse::new(
            assignments,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Insert a new current assignment inside the caller's transaction.
    ///
    /// The partial unique index rejects a second current record should the
    /// close-then-open protocol ever be violated; that surfaces as a
    /// concurrency error for the caller to retry.
    pub async fn insert_current(
        &self,
        conn: &mut PgConnection,
        data: &CreateAssignment,
    ) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>(
            "INSERT INTO staff_assignments (id, staff_id, department_id, facility_id, \
                                            role_id, rank_id, start_date, reason, is_current) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.staff_id)
        .bind(data.department_id)
        .bind(data.facility_id)
        .bind(data.role_id)
        .bind(data.rank_id)
        .bind(data.start_date)
        .bind(data.reason)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("staff_assignments_one_current") =>
            {
                AppError::concurrency("Another current assignment was opened concurrently")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert assignment", e),
        })
    }

    /// Close an assignment record inside the caller's transaction.
    pub async fn close(
        &self,
        conn: &mut PgConnection,
        assignment_id: Uuid,
        end_date: NaiveDate,
    ) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>(
            "UPDATE staff_assignments SET end_date = $2, is_current = FALSE \
             WHERE id = $1 AND is_current RETURNING *",
        )
        .bind(assignment_id)
        .bind(end_date)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to close assignment", e))?
        .ok_or_else(|| {
            AppError::integrity(format!("Assignment {assignment_id} is not open for closure"))
        })
    }

    /// Count current assignments for a staff member. Used by consistency
    /// checks; the answer must always be 0 or 1.
    pub async fn count_current(&self, staff_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM staff_assignments WHERE staff_id = $1 AND is_current",
        )
        .bind(staff_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count current assignments", e)
        })
    }
}
