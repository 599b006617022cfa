//! Reassignment and placement-history queries.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_core::AppResult;
use staffhub_database::repositories::{AssignmentRepository, CatalogRepository, StaffRepository};
use staffhub_entity::assignment::{Assignment, AssignmentReason, CreateAssignment};
use staffhub_entity::audit::{snapshot, AuditAction};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::locks::StaffLockRegistry;
use crate::retry::{with_retries, RetryPolicy};

/// Handles the assignment ledger.
#[derive(Debug, Clone)]
pub struct AssignmentService {
    pool: PgPool,
    staff_repo: Arc<StaffRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    catalog_repo: Arc<CatalogRepository>,
    audit: AuditRecorder,
    locks: Arc<StaffLockRegistry>,
    retry: RetryPolicy,
}

/// Data for reassigning a staff member.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReassignRequest {
    /// New department.
    pub department_id: Uuid,
    /// New facility.
    pub facility_id: Uuid,
    /// New role.
    pub role_id: Uuid,
    /// New rank.
    pub rank_id: Uuid,
    /// First day of the new assignment.
    pub start_date: NaiveDate,
    /// Why the placement changes.
    pub reason: AssignmentReason,
}

impl AssignmentService {
    /// Creates a new assignment service.
    pub fn new(
        pool: PgPool,
        staff_repo: Arc<StaffRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        catalog_repo: Arc<CatalogRepository>,
        audit: AuditRecorder,
        locks: Arc<StaffLockRegistry>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            pool,
            staff_repo,
            assignment_repo,
            catalog_repo,
            audit,
            locks,
            retry,
        }
    }

    /// Move a staff member to a new placement.
    ///
    /// Atomically closes the current assignment (end date = start − 1 day),
    /// opens the new current record, updates the staff row's pointer
    /// fields, and appends one audit entry. All four effects or none.
    pub async fn reassign(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        req: ReassignRequest,
    ) -> AppResult<Assignment> {
        if req.reason == AssignmentReason::Hire {
            return Err(AppError::validation(
                "Reason 'hire' is reserved for the initial assignment",
            ));
        }
        self.catalog_repo
            .resolve_placement(req.department_id, req.facility_id, req.role_id, req.rank_id)
            .await?;

        let _guard = self.locks.acquire(staff_id).await?;

        with_retries(&self.retry, async || {
            self.reassign_tx(ctx, staff_id, &req).await
        })
        .await
    }

    async fn reassign_tx(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        req: &ReassignRequest,
    ) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let staff = self
            .staff_repo
            .find_by_id_locked(&mut tx, staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff {staff_id} not found")))?;

        if !staff.employment_status.can_be_reassigned() {
            return Err(AppError::conflict(format!(
                "Staff in status '{}' cannot be reassigned",
                staff.employment_status
            )));
        }

        let current = self
            .assignment_repo
            .current_for_staff_locked(&mut tx, staff_id)
            .await?
            .ok_or_else(|| {
                AppError::integrity(format!("Staff {staff_id} has no current assignment"))
            })?;

        if req.start_date <= current.start_date {
            return Err(AppError::validation(format!(
                "Start date {} must be after the current assignment's start date {}",
                req.start_date, current.start_date
            )));
        }

        let close_date = req
            .start_date
            .pred_opt()
            .ok_or_else(|| AppError::validation("Start date is out of range"))?;

        let closed = self
            .assignment_repo
            .close(&mut tx, current.id, close_date)
            .await?;

        let opened = self
            .assignment_repo
            .insert_current(
                &mut tx,
                &CreateAssignment {
                    staff_id,
                    department_id: req.department_id,
                    facility_id: req.facility_id,
                    role_id: req.role_id,
                    rank_id: req.rank_id,
                    start_date: req.start_date,
                    reason: req.reason,
                },
            )
            .await?;

        let staff = self
            .staff_repo
            .update_placement(
                &mut tx,
                staff_id,
                req.department_id,
                req.facility_id,
                req.role_id,
                req.rank_id,
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                "staff_assignments",
                opened.id,
                AuditAction::Insert,
                Some(serde_json::json!({
                    "previous_assignment": snapshot(&current)?,
                })),
                Some(serde_json::json!({
                    "assignment": snapshot(&opened)?,
                    "closed_assignment": snapshot(&closed)?,
                    "staff": snapshot(&staff)?,
                })),
                ctx.actor_id,
            )
            .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(
            staff_id = %staff_id,
            assignment_id = %opened.id,
            reason = %req.reason,
            "Staff reassigned"
        );
        Ok(opened)
    }

    /// The staff member's present assignment.
    pub async fn current_assignment(&self, staff_id: Uuid) -> AppResult<Option<Assignment>> {
        self.assignment_repo.current_for_staff(staff_id).await
    }

    /// Placement history ordered by start date ascending.
    pub async fn history(
        &self,
        staff_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Assignment>> {
        self.assignment_repo.history(staff_id, page).await
    }
}
