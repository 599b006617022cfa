//! Reference catalog repository implementation.
//!
//! Catalog rows are maintained outside the ledger; this repository only
//! resolves references for validation and policy lookups.

use sqlx::PgPool;
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::result::AppResult;
use staffhub_entity::catalog::{Department, Facility, QualificationType, Rank, StaffRole};
use staffhub_entity::leave::LeaveCategory;

/// Repository over the read-mostly reference catalogs.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department by ID.
    pub async fn find_department(&self, id: Uuid) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find department", e))
    }

    /// Find a facility by ID.
    pub async fn find_facility(&self, id: Uuid) -> AppResult<Option<Facility>> {
        sqlx::query_as::<_, Facility>("SELECT * FROM facilities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find facility", e))
    }

    /// Find a role by ID.
    pub async fn find_role(&self, id: Uuid) -> AppResult<Option<StaffRole>> {
        sqlx::query_as::<_, StaffRole>("SELECT * FROM staff_roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    /// Find a rank by ID.
    pub async fn find_rank(&self, id: Uuid) -> AppResult<Option<Rank>> {
        sqlx::query_as::<_, Rank>("SELECT * FROM ranks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find rank", e))
    }

    /// Find a qualification type by ID.
    pub async fn find_qualification_type(&self, id: Uuid) -> AppResult<Option<QualificationType>> {
        sqlx::query_as::<_, QualificationType>("SELECT * FROM qualification_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find qualification type", e)
            })
    }

    /// Find a leave category by ID.
    pub async fn find_leave_category(&self, id: Uuid) -> AppResult<Option<LeaveCategory>> {
        sqlx::query_as::<_, LeaveCategory>("SELECT * FROM leave_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find leave category", e)
            })
    }

    /// Resolve a full placement (department, facility, role, rank),
    /// failing with a validation error on any dangling reference.
    pub async fn resolve_placement(
        &self,
        department_id: Uuid,
        facility_id: Uuid,
        role_id: Uuid,
        rank_id: Uuid,
    ) -> AppResult<()> {
        if self.find_department(department_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "Unknown department {department_id}"
            )));
        }
        if self.find_facility(facility_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "Unknown facility {facility_id}"
            )));
        }
        if self.find_role(role_id).await?.is_none() {
            return Err(AppError::validation(format!("Unknown role {role_id}")));
        }
        if self.find_rank(rank_id).await?.is_none() {
            return Err(AppError::validation(format!("Unknown rank {rank_id}")));
        }
        Ok(())
    }
}
