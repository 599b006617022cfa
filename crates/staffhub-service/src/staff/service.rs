//! Staff lifecycle operations: hire, profile updates, status changes,
//! and supervisor assignment.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::AppResult;
use staffhub_database::repositories::{
    ApplicationRepository, AssignmentRepository, CatalogRepository, EntitlementRepository,
    StaffRepository,
};
use staffhub_entity::assignment::{Assignment, AssignmentReason, CreateAssignment};
use staffhub_entity::audit::{snapshot, AuditAction};
use staffhub_entity::leave::ApplicationStatus;
use staffhub_entity::staff::{CreateStaff, EmploymentStatus, Staff};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::locks::StaffLockRegistry;
use crate::retry::{with_retries, RetryPolicy};

/// Handles staff registry operations.
#[derive(Debug, Clone)]
pub struct StaffService {
    pool: PgPool,
    staff_repo: Arc<StaffRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    application_repo: Arc<ApplicationRepository>,
    entitlement_repo: Arc<EntitlementRepository>,
    catalog_repo: Arc<CatalogRepository>,
    audit: AuditRecorder,
    locks: Arc<StaffLockRegistry>,
    retry: RetryPolicy,
    chain_limit: u32,
}

/// Data for hiring a new staff member.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HireRequest {
    /// Employee number (unique).
    pub employee_no: String,
    /// Email address (unique).
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Initial department.
    pub department_id: Uuid,
    /// Initial facility.
    pub facility_id: Uuid,
    /// Initial role.
    pub role_id: Uuid,
    /// Initial rank.
    pub rank_id: Uuid,
    /// Direct supervisor, if any.
    pub supervisor_id: Option<Uuid>,
    /// Date of hire; also the first assignment's start date.
    pub hire_date: NaiveDate,
}

/// Data for updating a staff member's profile.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateProfileRequest {
    /// New email address (optional).
    pub email: Option<String>,
    /// New given name (optional).
    pub first_name: Option<String>,
    /// New family name (optional).
    pub last_name: Option<String>,
}

impl StaffService {
    /// Creates a new staff service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        staff_repo: Arc<StaffRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        application_repo: Arc<ApplicationRepository>,
        entitlement_repo: Arc<EntitlementRepository>,
        catalog_repo: Arc<CatalogRepository>,
        audit: AuditRecorder,
        locks: Arc<StaffLockRegistry>,
        retry: RetryPolicy,
        chain_limit: u32,
    ) -> Self {
        Self {
            pool,
            staff_repo,
            assignment_repo,
            application_repo,
            entitlement_repo,
            catalog_repo,
            audit,
            locks,
            retry,
            chain_limit,
        }
    }

    /// Fetch a staff member, failing when absent.
    pub async fn get(&self, staff_id: Uuid) -> AppResult<Staff> {
        self.staff_repo
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff {staff_id} not found")))
    }

    /// Hire a new staff member.
    ///
    /// Creates the staff row and its first assignment (reason = hire) as a
    /// single atomic unit with one audit entry covering both.
    pub async fn hire(
        &self,
        ctx: &RequestContext,
        req: HireRequest,
    ) -> AppResult<(Staff, Assignment)> {
        validate_hire(&req)?;

        if self
            .staff_repo
            .find_by_employee_no(&req.employee_no)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Employee number '{}' already exists",
                req.employee_no
            )));
        }
        if self.staff_repo.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict("Email already in use"));
        }

        self.catalog_repo
            .resolve_placement(req.department_id, req.facility_id, req.role_id, req.rank_id)
            .await?;

        if let Some(supervisor_id) = req.supervisor_id {
            self.get(supervisor_id).await.map_err(|_| {
                AppError::validation(format!("Unknown supervisor {supervisor_id}"))
            })?;
        }

        let mut tx = self.begin().await?;

        let staff = self
            .staff_repo
            .create(
                &mut tx,
                &CreateStaff {
                    employee_no: req.employee_no.clone(),
                    email: req.email.clone(),
                    first_name: req.first_name.clone(),
                    last_name: req.last_name.clone(),
                    department_id: req.department_id,
                    facility_id: req.facility_id,
                    role_id: req.role_id,
                    rank_id: req.rank_id,
                    supervisor_id: req.supervisor_id,
                    hire_date: req.hire_date,
                },
            )
            .await?;

        let assignment = self
            .assignment_repo
            .insert_current(
                &mut tx,
                &CreateAssignment {
                    staff_id: staff.id,
                    department_id: req.department_id,
                    facility_id: req.facility_id,
                    role_id: req.role_id,
                    rank_id: req.rank_id,
                    start_date: req.hire_date,
                    reason: AssignmentReason::Hire,
                },
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                "staff",
                staff.id,
                AuditAction::Insert,
                None,
                Some(serde_json::json!({
                    "staff": snapshot(&staff)?,
                    "assignment": snapshot(&assignment)?,
                })),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(staff_id = %staff.id, employee_no = %staff.employee_no, "Staff hired");
        Ok((staff, assignment))
    }

    /// Update a staff member's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<Staff> {
        let before = self.get(staff_id).await?;

        if let Some(email) = req.email.as_deref() {
            if !email.contains('@') {
                return Err(AppError::validation("Invalid email format"));
            }
            if let Some(existing) = self.staff_repo.find_by_email(email).await? {
                if existing.id != staff_id {
                    return Err(AppError::conflict("Email already in use"));
                }
            }
        }
        if matches!(req.first_name.as_deref(), Some(name) if name.trim().is_empty())
            || matches!(req.last_name.as_deref(), Some(name) if name.trim().is_empty())
        {
            return Err(AppError::validation("Name cannot be empty"));
        }

        let mut tx = self.begin().await?;

        let staff = self
            .staff_repo
            .update_profile(
                &mut tx,
                staff_id,
                req.email.as_deref(),
                req.first_name.as_deref(),
                req.last_name.as_deref(),
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                "staff",
                staff.id,
                AuditAction::Update,
                Some(snapshot(&before)?),
                Some(snapshot(&staff)?),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(staff_id = %staff.id, "Profile updated");
        Ok(staff)
    }

    /// Change a staff member's employment status.
    ///
    /// Termination additionally closes the current assignment at the
    /// effective date and cancels every pending leave application,
    /// releasing the reserved days, all in the same transaction.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        new_status: EmploymentStatus,
        effective_date: NaiveDate,
    ) -> AppResult<Staff> {
        let _guard = self.locks.acquire(staff_id).await?;

        with_retries(&self.retry, async || {
            self.change_status_tx(ctx, staff_id, new_status, effective_date)
                .await
        })
        .await
    }

    async fn change_status_tx(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        new_status: EmploymentStatus,
        effective_date: NaiveDate,
    ) -> AppResult<Staff> {
        let mut tx = self.begin().await?;

        let before = self
            .staff_repo
            .find_by_id_locked(&mut tx, staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff {staff_id} not found")))?;

        if before.employment_status == new_status {
            return Err(AppError::conflict(format!(
                "Staff already has status '{new_status}'"
            )));
        }
        if before.employment_status == EmploymentStatus::Terminated {
            return Err(AppError::conflict(
                "Terminated staff cannot change status",
            ));
        }

        let mut closed_assignment = None;
        let mut cancelled_applications = Vec::new();

        if new_status == EmploymentStatus::Terminated {
            if let Some(current) = self
                .assignment_repo
                .current_for_staff_locked(&mut tx, staff_id)
                .await?
            {
                if effective_date < current.start_date {
                    return Err(AppError::validation(format!(
                        "Effective date {effective_date} precedes current assignment start {}",
                        current.start_date
                    )));
                }
                closed_assignment = Some(
                    self.assignment_repo
                        .close(&mut tx, current.id, effective_date)
                        .await?,
                );
            }

            for application in self
                .application_repo
                .pending_for_staff_locked(&mut tx, staff_id)
                .await?
            {
                let mut entitlement = self
                    .entitlement_repo
                    .find_for_update(
                        &mut tx,
                        application.staff_id,
                        application.category_id,
                        application.entitlement_year(),
                    )
                    .await?
                    .ok_or_else(|| {
                        AppError::integrity(format!(
                            "Entitlement missing for pending application {}",
                            application.id
                        ))
                    })?;

                entitlement.release(application.total_days)?;
                self.entitlement_repo
                    .save_counters(&mut tx, &entitlement)
                    .await?;

                let cancelled = self
                    .application_repo
                    .decide(
                        &mut tx,
                        application.id,
                        ApplicationStatus::Cancelled,
                        ctx.actor_id,
                        None,
                    )
                    .await?;
                cancelled_applications.push(cancelled.id);
            }
        }

        let termination_date =
            (new_status == EmploymentStatus::Terminated).then_some(effective_date);
        let staff = self
            .staff_repo
            .update_status(&mut tx, staff_id, new_status, termination_date)
            .await?;

        let cancelled_count = cancelled_applications.len();
        self.audit
            .record(
                &mut tx,
                "staff",
                staff.id,
                AuditAction::Update,
                Some(snapshot(&before)?),
                Some(serde_json::json!({
                    "staff": snapshot(&staff)?,
                    "closed_assignment": closed_assignment
                        .as_ref()
                        .map(snapshot)
                        .transpose()?,
                    "cancelled_applications": cancelled_applications,
                })),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(
            staff_id = %staff.id,
            status = %new_status,
            cancelled = cancelled_count,
            "Status changed"
        );
        Ok(staff)
    }

    /// Assign (or clear) a staff member's supervisor.
    ///
    /// Rejects links that would make the supervisor chain reach back to the
    /// staff member. The walk is bounded so corrupt data cannot loop.
    pub async fn assign_supervisor(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        supervisor_id: Option<Uuid>,
    ) -> AppResult<Staff> {
        let _guard = self.locks.acquire(staff_id).await?;

        let before = self.get(staff_id).await?;

        if let Some(candidate) = supervisor_id {
            self.get(candidate).await.map_err(|_| {
                AppError::validation(format!("Unknown supervisor {candidate}"))
            })?;

            let links = self.staff_repo.supervisor_links().await?;
            if chain_reaches(&links, candidate, staff_id, self.chain_limit)? {
                return Err(AppError::conflict(format!(
                    "Assigning supervisor {candidate} would create a cycle"
                )));
            }
        }

        let mut tx = self.begin().await?;

        let staff = self
            .staff_repo
            .update_supervisor(&mut tx, staff_id, supervisor_id)
            .await?;

        self.audit
            .record(
                &mut tx,
                "staff",
                staff.id,
                AuditAction::Update,
                Some(snapshot(&before)?),
                Some(snapshot(&staff)?),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(staff_id = %staff.id, supervisor = ?supervisor_id, "Supervisor assigned");
        Ok(staff)
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    async fn commit(&self, tx: sqlx::Transaction<'static, sqlx::Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}

/// Walk supervisor links from `start`, reporting whether `target` is on the
/// chain. The walk visits at most `limit` links; a longer chain means the
/// stored data itself is cyclic or corrupt.
fn chain_reaches(
    links: &HashMap<Uuid, Uuid>,
    start: Uuid,
    target: Uuid,
    limit: u32,
) -> AppResult<bool> {
    let mut current = start;
    for _ in 0..=limit {
        if current == target {
            return Ok(true);
        }
        match links.get(&current) {
            Some(&next) => current = next,
            None => return Ok(false),
        }
    }
    Err(AppError::integrity(format!(
        "Supervisor chain from {start} exceeds {limit} links"
    )))
}

fn validate_hire(req: &HireRequest) -> AppResult<()> {
    if req.employee_no.trim().is_empty() {
        return Err(AppError::validation("Employee number cannot be empty"));
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::now_v7()).collect()
    }

    #[test]
    fn test_chain_reaches_target() {
        let v = ids(3);
        // v0 -> v1 -> v2
        let links: HashMap<Uuid, Uuid> = [(v[0], v[1]), (v[1], v[2])].into();
        assert!(chain_reaches(&links, v[0], v[2], 10).unwrap());
        assert!(!chain_reaches(&links, v[2], v[0], 10).unwrap());
    }

    #[test]
    fn test_direct_cycle_detected() {
        // B supervised by A; assigning A under B walks B -> A.
        let v = ids(2);
        let links: HashMap<Uuid, Uuid> = [(v[1], v[0])].into();
        assert!(chain_reaches(&links, v[1], v[0], 10).unwrap());
    }

    #[test]
    fn test_self_is_always_a_cycle() {
        let a = Uuid::now_v7();
        assert!(chain_reaches(&HashMap::new(), a, a, 10).unwrap());
    }

    #[test]
    fn test_corrupt_cyclic_data_hits_bound() {
        let v = ids(2);
        // v0 <-> v1 with an unrelated target: the walk must terminate.
        let links: HashMap<Uuid, Uuid> = [(v[0], v[1]), (v[1], v[0])].into();
        let err = chain_reaches(&links, v[0], Uuid::now_v7(), 10).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
    }
}
