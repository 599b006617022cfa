//! Qualification repository implementation.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_entity::qualification::{CreateQualification, Qualification, VerificationStatus};

/// Repository for staff qualification records.
#[derive(Debug, Clone)]
pub struct QualificationRepository {
    pool: PgPool,
}

impl QualificationRepository {
    /// Create a new qualification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a qualification by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Qualification>> {
        sqlx::query_as::<_, Qualification>("SELECT * FROM staff_qualifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find qualification", e)
            })
    }

    /// Find a qualification inside the caller's transaction, locked
    /// against concurrent verification.
    pub async fn find_by_id_locked(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<Qualification>> {
        sqlx::query_as::<_, Qualification>(
            "SELECT * FROM staff_qualifications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock qualification", e))
    }

    /// Find a non-revoked record for the same (staff, type, name).
    pub async fn find_active(
        &self,
        staff_id: Uuid,
        qualification_type_id: Uuid,
        name: &str,
    ) -> AppResult<Option<Qualification>> {
        sqlx::query_as::<_, Qualification>(
            "SELECT * FROM staff_qualifications \
             WHERE staff_id = $1 AND qualification_type_id = $2 AND name = $3 \
               AND verification_status <> 'revoked'",
        )
        .bind(staff_id)
        .bind(qualification_type_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active qualification", e)
        })
    }

    /// List qualifications for a staff member.
    pub async fn list_for_staff(&self, staff_id: Uuid) -> AppResult<Vec<Qualification>> {
        sqlx::query_as::<_, Qualification>(
            "SELECT * FROM staff_qualifications WHERE staff_id = $1 ORDER BY issue_date ASC, id ASC",
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list qualifications", e)
        })
    }

    /// Insert a new qualification record inside the caller's transaction.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreateQualification,
    ) -> AppResult<Qualification> {
        sqlx::query_as::<_, Qualification>(
            "INSERT INTO staff_qualifications (id, staff_id, qualification_type_id, \
                                               name, issue_date, expiry_date, verification_status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending') \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.staff_id)
        .bind(data.qualification_type_id)
        .bind(&data.name)
        .bind(data.issue_date)
        .bind(data.expiry_date)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("staff_qualifications_active_key") =>
            {
                AppError::conflict(format!(
                    "Qualification '{}' is already recorded and active",
                    data.name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create qualification", e),
        })
    }

    /// Record a verification decision inside the caller's transaction.
    pub async fn update_verification(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: VerificationStatus,
        verifier_id: Uuid,
        note: Option<&str>,
    ) -> AppResult<Qualification> {
        sqlx::query_as::<_, Qualification>(
            "UPDATE staff_qualifications SET verification_status = $2, verifier_id = $3, \
                                             verified_at = NOW(), note = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(verifier_id)
        .bind(note)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update verification", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Qualification {id} not found")))
    }

    /// Verified qualifications expiring within `(today, today + days]`,
    /// ordered by expiry date. Stable ordering makes pages restartable
    /// against a fixed `today`.
    pub async fn expiring_within(
        &self,
        today: NaiveDate,
        days: i64,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Qualification>> {
        let horizon = today + chrono::Duration::days(days);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM staff_qualifications \
             WHERE verification_status = 'verified' \
               AND expiry_date IS NOT NULL AND expiry_date >= $1 AND expiry_date <= $2",
        )
        .bind(today)
        .bind(horizon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count expiring records", e)
        })?;

        let records = sqlx::query_as::<_, Qualification>(
            "SELECT * FROM staff_qualifications \
             WHERE verification_status = 'verified' \
               AND expiry_date IS NOT NULL AND expiry_date >= $1 AND expiry_date <= $2 \
             ORDER BY expiry_date ASC, id ASC LIMIT $3 OFFSET $4",
        )
        .bind(today)
        .bind(horizon)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list expiring records", e)
        })?;

        Ok(PageResponse::new(
            records,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
