//! Staff registry repository implementation.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_entity::staff::{CreateStaff, EmploymentStatus, Staff};

/// Repository for staff records.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    /// Create a new staff repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a staff member by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Staff>> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find staff by id", e))
    }

    /// Find a staff member by primary key, locking the row for the
    /// duration of the caller's transaction.
    pub async fn find_by_id_locked(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<Staff>> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock staff row", e))
    }

    /// Find a staff member by employee number.
    pub async fn find_by_employee_no(&self, employee_no: &str) -> AppResult<Option<Staff>> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE employee_no = $1")
            .bind(employee_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find staff by employee no", e)
            })
    }

    /// Find a staff member by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Staff>> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find staff by email", e)
            })
    }

    /// List staff with pagination, ordered by employee number.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Staff>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count staff", e))?;

        let staff = sqlx::query_as::<_, Staff>(
            "SELECT * FROM staff ORDER BY employee_no ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list staff", e))?;

        Ok(PageResponse::new(
            staff,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Insert a new staff row inside the caller's transaction.
    pub async fn create(&self, conn: &mut PgConnection, data: &CreateStaff) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>(
            "INSERT INTO staff (id, employee_no, email, first_name, last_name, \
                                department_id, facility_id, role_id, rank_id, \
                                employment_status, supervisor_id, hire_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', $10, $11) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.employee_no)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.department_id)
        .bind(data.facility_id)
        .bind(data.role_id)
        .bind(data.rank_id)
        .bind(data.supervisor_id)
        .bind(data.hire_date)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("staff_employee_no_key") =>
            {
                AppError::conflict(format!(
                    "Employee number '{}' already exists",
                    data.employee_no
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("staff_email_key") => {
                AppError::conflict("Email already in use".to_string())
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create staff", e),
        })
    }

    /// Update profile fields inside the caller's transaction.
    pub async fn update_profile(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>(
            "UPDATE staff SET email = COALESCE($2, email), \
                              first_name = COALESCE($3, first_name), \
                              last_name = COALESCE($4, last_name), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("staff_email_key") => {
                AppError::conflict("Email already in use".to_string())
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update staff profile", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Staff {id} not found")))
    }

    /// Update employment status inside the caller's transaction.
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: EmploymentStatus,
        termination_date: Option<NaiveDate>,
    ) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>(
            "UPDATE staff SET employment_status = $2, \
                              termination_date = $3, \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(termination_date)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update status", e))?
        .ok_or_else(|| AppError::not_found(format!("Staff {id} not found")))
    }

    /// Update the supervisor link inside the caller's transaction.
    pub async fn update_supervisor(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        supervisor_id: Option<Uuid>,
    ) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>(
            "UPDATE staff SET supervisor_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(supervisor_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update supervisor", e))?
        .ok_or_else(|| AppError::not_found(format!("Staff {id} not found")))
    }

    /// Update the current-placement pointer fields inside the caller's
    /// transaction. Only ever called alongside an assignment-ledger write.
    pub async fn update_placement(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        department_id: Uuid,
        facility_id: Uuid,
        role_id: Uuid,
        rank_id: Uuid,
    ) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>(
            "UPDATE staff SET department_id = $2, facility_id = $3, \
                              role_id = $4, rank_id = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(department_id)
        .bind(facility_id)
        .bind(role_id)
        .bind(rank_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update placement", e))?
        .ok_or_else(|| AppError::not_found(format!("Staff {id} not found")))
    }

    /// Fetch the supervisor link for one staff member.
    pub async fn supervisor_of(&self, id: Uuid) -> AppResult<Option<Uuid>> {
        let row: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT supervisor_id FROM staff WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to fetch supervisor link", e)
                })?;

        match row {
            Some((link,)) => Ok(link),
            None => Err(AppError::not_found(format!("Staff {id} not found"))),
        }
    }

    /// Fetch every supervisor link as a child -> supervisor map.
    ///
    /// The registry is catalog-sized, so materializing the links bounds the
    /// cycle walk even if the stored data is corrupt.
    pub async fn supervisor_links(&self) -> AppResult<std::collections::HashMap<Uuid, Uuid>> {
        let rows: Vec<(Uuid, Uuid)> =
            sqlx::query_as("SELECT id, supervisor_id FROM staff WHERE supervisor_id IS NOT NULL")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to fetch supervisor links", e)
                })?;
        Ok(rows.into_iter().collect())
    }

    /// Count total staff records.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count staff", e))?;
        Ok(count as u64)
    }
}
