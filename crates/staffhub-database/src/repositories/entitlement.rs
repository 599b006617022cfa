//! Leave entitlement repository implementation.
//!
//! Counter updates always write the full set of mutable columns from an
//! entity that went through the invariant-checked arithmetic, so the
//! stored row can never drift from the derived balance.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_entity::leave::entitlement::CreateEntitlement;
use staffhub_entity::leave::LeaveEntitlement;

/// Repository for leave entitlement rows.
#[derive(Debug, Clone)]
pub struct EntitlementRepository {
    pool: PgPool,
}

impl EntitlementRepository {
    /// Create a new entitlement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the entitlement for (staff, category, year).
    pub async fn find(
        &self,
        staff_id: Uuid,
        category_id: Uuid,
        year: i32,
    ) -> AppResult<Option<LeaveEntitlement>> {
        sqlx::query_as::<_, LeaveEntitlement>(
            "SELECT * FROM leave_entitlements \
             WHERE staff_id = $1 AND category_id = $2 AND year = $3",
        )
        .bind(staff_id)
        .bind(category_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find entitlement", e))
    }

    /// Find the entitlement inside the caller's transaction, locking the
    /// row so balance arithmetic cannot race.
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        staff_id: Uuid,
        category_id: Uuid,
        year: i32,
    ) -> AppResult<Option<LeaveEntitlement>> {
        sqlx::query_as::<_, LeaveEntitlement>(
            "SELECT * FROM leave_entitlements \
             WHERE staff_id = $1 AND category_id = $2 AND year = $3 FOR UPDATE",
        )
        .bind(staff_id)
        .bind(category_id)
        .bind(year)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock entitlement", e))
    }

    /// All entitlements for a staff member in one year.
    pub async fn for_staff_year(
        &self,
        staff_id: Uuid,
        year: i32,
    ) -> AppResult<Vec<LeaveEntitlement>> {
        sqlx::query_as::<_, LeaveEntitlement>(
            "SELECT * FROM leave_entitlements WHERE staff_id = $1 AND year = $2 \
             ORDER BY category_id",
        )
        .bind(staff_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list entitlements", e))
    }

    /// Insert a new entitlement row inside the caller's transaction.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreateEntitlement,
    ) -> AppResult<LeaveEntitlement> {
        sqlx::query_as::<_, LeaveEntitlement>(
            "INSERT INTO leave_entitlements (id, staff_id, category_id, year, \
                                             allocated_days, carried_forward_days) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.staff_id)
        .bind(data.category_id)
        .bind(data.year)
        .bind(data.allocated_days)
        .bind(data.carried_forward_days)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("leave_entitlements_staff_category_year_key") =>
            {
                AppError::conflict(format!(
                    "Entitlement already exists for staff {} category {} year {}",
                    data.staff_id, data.category_id, data.year
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create entitlement", e),
        })
    }

    /// Write back the mutable counters of an entitlement inside the
    /// caller's transaction.
    pub async fn save_counters(
        &self,
        conn: &mut PgConnection,
        entitlement: &LeaveEntitlement,
    ) -> AppResult<LeaveEntitlement> {
        sqlx::query_as::<_, LeaveEntitlement>(
            "UPDATE leave_entitlements SET used_days = $2, pending_days = $3, \
                                           updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(entitlement.id)
        .bind(entitlement.used_days)
        .bind(entitlement.pending_days)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update entitlement counters", e)
        })?
        .ok_or_else(|| {
            AppError::integrity(format!("Entitlement {} vanished during update", entitlement.id))
        })
    }
}
