//! Leave filing, review, cancellation, and balance queries.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::traits::calendar::{business_days_between, calendar_days_between};
use staffhub_core::traits::permission::{Action, Module, PermissionChecker};
use staffhub_core::traits::HolidayCalendar;
use staffhub_core::AppResult;
use staffhub_database::repositories::{
    ApplicationRepository, CatalogRepository, EntitlementRepository, StaffRepository,
};
use staffhub_entity::audit::{snapshot, AuditAction};
use staffhub_entity::leave::entitlement::CreateEntitlement;
use staffhub_entity::leave::{
    ApplicationStatus, CreateApplication, LeaveApplication, LeaveCategory, LeaveEntitlement,
};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::locks::StaffLockRegistry;
use crate::retry::{with_retries, RetryPolicy};

/// Handles the leave ledger.
#[derive(Clone)]
pub struct LeaveService {
    pool: PgPool,
    staff_repo: Arc<StaffRepository>,
    application_repo: Arc<ApplicationRepository>,
    entitlement_repo: Arc<EntitlementRepository>,
    catalog_repo: Arc<CatalogRepository>,
    audit: AuditRecorder,
    locks: Arc<StaffLockRegistry>,
    retry: RetryPolicy,
    permissions: Arc<dyn PermissionChecker>,
    calendar: Arc<dyn HolidayCalendar>,
}

/// Data for filing a leave application.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileLeaveRequest {
    /// The applicant.
    pub staff_id: Uuid,
    /// The leave category applied under.
    pub category_id: Uuid,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Applicant's stated reason.
    pub reason: Option<String>,
}

/// Outcome requested by a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    /// Approve the application.
    Approve,
    /// Reject the application; a reason is required.
    Reject,
}

impl LeaveService {
    /// Creates a new leave service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        staff_repo: Arc<StaffRepository>,
        application_repo: Arc<ApplicationRepository>,
        entitlement_repo: Arc<EntitlementRepository>,
        catalog_repo: Arc<CatalogRepository>,
        audit: AuditRecorder,
        locks: Arc<StaffLockRegistry>,
        retry: RetryPolicy,
        permissions: Arc<dyn PermissionChecker>,
        calendar: Arc<dyn HolidayCalendar>,
    ) -> Self {
        Self {
            pool,
            staff_repo,
            application_repo,
            entitlement_repo,
            catalog_repo,
            audit,
            locks,
            retry,
            permissions,
            calendar,
        }
    }

    /// Create the (staff, category, year) entitlement row.
    ///
    /// Called by the external year-rollover scheduler and by HR when
    /// onboarding. Ledger operations referencing a missing entitlement
    /// fail rather than creating one implicitly.
    pub async fn grant_entitlement(
        &self,
        ctx: &RequestContext,
        staff_id: Uuid,
        category_id: Uuid,
        year: i32,
        allocated_days: i32,
        carried_forward_days: i32,
    ) -> AppResult<LeaveEntitlement> {
        if allocated_days < 0 || carried_forward_days < 0 {
            return Err(AppError::validation("Entitlement days cannot be negative"));
        }

        self.staff_repo
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff {staff_id} not found")))?;
        let category = self.category(category_id).await?;

        if carried_forward_days > 0 && !category.carry_forward {
            return Err(AppError::validation(format!(
                "Category '{}' does not allow carry-forward",
                category.code
            )));
        }

        let _guard = self.locks.acquire(staff_id).await?;
        let mut tx = self.begin().await?;

        let entitlement = self
            .entitlement_repo
            .create(
                &mut tx,
                &CreateEntitlement {
                    staff_id,
                    category_id,
                    year,
                    allocated_days,
                    carried_forward_days,
                },
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                "leave_entitlements",
                entitlement.id,
                AuditAction::Insert,
                None,
                Some(snapshot(&entitlement)?),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(staff_id = %staff_id, category = %category.code, year, "Entitlement granted");
        Ok(entitlement)
    }

    /// File a leave application.
    ///
    /// Computes the day total per category policy, enforces notice and
    /// consecutive-day limits, and reserves the days as pending against
    /// the matching entitlement.
    pub async fn file_application(
        &self,
        ctx: &RequestContext,
        req: FileLeaveRequest,
    ) -> AppResult<LeaveApplication> {
        if req.end_date < req.start_date {
            return Err(AppError::validation("End date precedes start date"));
        }
        // Applications may not span a year boundary: each draws from
        // exactly one (staff, category, year) entitlement.
        if req.start_date.year() != req.end_date.year() {
            return Err(AppError::validation(
                "Leave may not span a year boundary; file one application per year",
            ));
        }

        let staff = self
            .staff_repo
            .find_by_id(req.staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff {} not found", req.staff_id)))?;
        if !staff.employment_status.can_take_leave() {
            return Err(AppError::policy(format!(
                "Staff in status '{}' cannot file leave",
                staff.employment_status
            )));
        }

        let category = self.category(req.category_id).await?;

        let notice_days = (req.start_date - ctx.today()).num_days();
        if notice_days < category.min_notice_days as i64 {
            return Err(AppError::policy(format!(
                "Category '{}' requires {} days notice, got {}",
                category.code,
                category.min_notice_days,
                notice_days.max(0)
            )));
        }

        let total_days = self.count_days(&category, req.start_date, req.end_date);
        if total_days <= 0 {
            return Err(AppError::validation(
                "Requested range contains no leave days",
            ));
        }
        if category.exceeds_consecutive_limit(total_days) {
            return Err(AppError::policy(format!(
                "Category '{}' allows at most {} consecutive days, requested {}",
                category.code, category.max_consecutive_days, total_days
            )));
        }

        let _guard = self.locks.acquire(req.staff_id).await?;

        let application = with_retries(&self.retry, async || {
            self.file_tx(ctx, &req, &category, total_days).await
        })
        .await?;

        info!(
            staff_id = %req.staff_id,
            application_id = %application.id,
            total_days,
            "Leave application filed"
        );
        Ok(application)
    }

    async fn file_tx(
        &self,
        ctx: &RequestContext,
        req: &FileLeaveRequest,
        category: &LeaveCategory,
        total_days: i32,
    ) -> AppResult<LeaveApplication> {
        let year = req.start_date.year();
        let mut tx = self.begin().await?;

        let mut entitlement = self
            .entitlement_repo
            .find_for_update(&mut tx, req.staff_id, req.category_id, year)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No entitlement for staff {} category '{}' year {year}",
                    req.staff_id, category.code
                ))
            })?;

        let entitlement_before = snapshot(&entitlement)?;
        entitlement.reserve(total_days, category.allow_negative_balance)?;
        entitlement.check_consistency()?;
        let entitlement = self
            .entitlement_repo
            .save_counters(&mut tx, &entitlement)
            .await?;

        let application = self
            .application_repo
            .create(
                &mut tx,
                &CreateApplication {
                    staff_id: req.staff_id,
                    category_id: req.category_id,
                    start_date: req.start_date,
                    end_date: req.end_date,
                    total_days,
                    reason: req.reason.clone(),
                },
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                "leave_applications",
                application.id,
                AuditAction::Insert,
                Some(serde_json::json!({ "entitlement": entitlement_before })),
                Some(serde_json::json!({
                    "application": snapshot(&application)?,
                    "entitlement": snapshot(&entitlement)?,
                })),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;
        Ok(application)
    }

    /// Decide a pending application.
    ///
    /// Approval requires authority over the applicant's department and
    /// moves the reserved days to used; rejection requires a reason and
    /// releases them.
    pub async fn review(
        &self,
        ctx: &RequestContext,
        application_id: Uuid,
        decision: ReviewDecision,
        rejection_reason: Option<String>,
    ) -> AppResult<LeaveApplication> {
        if decision == ReviewDecision::Reject
            && rejection_reason.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(AppError::validation("Rejection requires a reason"));
        }

        let application = self
            .application_repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Application {application_id} not found"))
            })?;

        let staff = self
            .staff_repo
            .find_by_id(application.staff_id)
            .await?
            .ok_or_else(|| {
                AppError::integrity(format!("Applicant {} vanished", application.staff_id))
            })?;

        let allowed = self
            .permissions
            .has_permission(ctx.actor_id, Module::Leave, Action::Approve, staff.department_id)
            .await?;
        if !allowed {
            return Err(AppError::authorization(format!(
                "Actor {} may not review leave for department {}",
                ctx.actor_id, staff.department_id
            )));
        }

        let target = match decision {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        };

        let _guard = self.locks.acquire(application.staff_id).await?;

        let decided = with_retries(&self.retry, async || {
            self.decide_tx(ctx, application_id, target, rejection_reason.as_deref())
                .await
        })
        .await?;

        info!(
            application_id = %decided.id,
            status = %decided.status,
            reviewer = %ctx.actor_id,
            "Leave application reviewed"
        );
        Ok(decided)
    }

    /// Cancel a pending application, releasing its reserved days.
    ///
    /// Only the applicant may cancel their own application; anyone else
    /// needs write authority over the applicant's department.
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        application_id: Uuid,
    ) -> AppResult<LeaveApplication> {
        let application = self
            .application_repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Application {application_id} not found"))
            })?;

        if ctx.actor_id != application.staff_id {
            let staff = self
                .staff_repo
                .find_by_id(application.staff_id)
                .await?
                .ok_or_else(|| {
                    AppError::integrity(format!("Applicant {} vanished", application.staff_id))
                })?;
            let allowed = self
                .permissions
                .has_permission(ctx.actor_id, Module::Leave, Action::Write, staff.department_id)
                .await?;
            if !allowed {
                return Err(AppError::authorization(format!(
                    "Actor {} may not cancel application {application_id}",
                    ctx.actor_id
                )));
            }
        }

        let _guard = self.locks.acquire(application.staff_id).await?;

        let cancelled = with_retries(&self.retry, async || {
            self.decide_tx(ctx, application_id, ApplicationStatus::Cancelled, None)
                .await
        })
        .await?;

        info!(application_id = %cancelled.id, "Leave application cancelled");
        Ok(cancelled)
    }

    async fn decide_tx(
        &self,
        ctx: &RequestContext,
        application_id: Uuid,
        target: ApplicationStatus,
        rejection_reason: Option<&str>,
    ) -> AppResult<LeaveApplication> {
        let mut tx = self.begin().await?;

        let application = self
            .application_repo
            .find_by_id_locked(&mut tx, application_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Application {application_id} not found"))
            })?;

        if !application.status.can_transition(target) {
            return Err(AppError::conflict(format!(
                "Application {application_id} is already {}",
                application.status
            )));
        }

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
                    "Entitlement missing for application {application_id}"
                ))
            })?;

        let application_before = snapshot(&application)?;
        let entitlement_before = snapshot(&entitlement)?;

        match target {
            ApplicationStatus::Approved => entitlement.commit(application.total_days)?,
            ApplicationStatus::Rejected | ApplicationStatus::Cancelled => {
                entitlement.release(application.total_days)?
            }
            ApplicationStatus::Pending => {
                return Err(AppError::validation("Cannot decide back to pending"))
            }
        }
        entitlement.check_consistency()?;
        let entitlement = self
            .entitlement_repo
            .save_counters(&mut tx, &entitlement)
            .await?;

        let decided = self
            .application_repo
            .decide(&mut tx, application_id, target, ctx.actor_id, rejection_reason)
            .await?;

        self.audit
            .record(
                &mut tx,
                "leave_applications",
                decided.id,
                AuditAction::Update,
                Some(serde_json::json!({
                    "application": application_before,
                    "entitlement": entitlement_before,
                })),
                Some(serde_json::json!({
                    "application": snapshot(&decided)?,
                    "entitlement": snapshot(&entitlement)?,
                })),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;
        Ok(decided)
    }

    /// The derived remaining balance for (staff, category, year).
    pub async fn balance(
        &self,
        staff_id: Uuid,
        category_id: Uuid,
        year: i32,
    ) -> AppResult<i32> {
        let entitlement = self
            .entitlement_repo
            .find(staff_id, category_id, year)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No entitlement for staff {staff_id} category {category_id} year {year}"
                ))
            })?;
        Ok(entitlement.remaining())
    }

    /// All of a staff member's entitlements for one year.
    pub async fn leave_summary(
        &self,
        staff_id: Uuid,
        year: i32,
    ) -> AppResult<Vec<LeaveEntitlement>> {
        self.entitlement_repo.for_staff_year(staff_id, year).await
    }

    fn count_days(&self, category: &LeaveCategory, start: NaiveDate, end: NaiveDate) -> i32 {
        if category.business_days_only {
            business_days_between(start, end, self.calendar.as_ref())
        } else {
            calendar_days_between(start, end)
        }
    }

    async fn category(&self, category_id: Uuid) -> AppResult<LeaveCategory> {
        self.catalog_repo
            .find_leave_category(category_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Leave category {category_id} not found")))
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
