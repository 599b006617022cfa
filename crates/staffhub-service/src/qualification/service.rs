//! Qualification recording, verification, and expiry scans.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use staffhub_core::error::{AppError, ErrorKind};
use staffhub_core::traits::permission::{Action, Module, PermissionChecker};
use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_core::AppResult;
use staffhub_database::repositories::{CatalogRepository, QualificationRepository, StaffRepository};
use staffhub_entity::audit::{snapshot, AuditAction};
use staffhub_entity::qualification::{CreateQualification, Qualification, VerificationStatus};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;

/// Handles the qualification tracker.
#[derive(Clone)]
pub struct QualificationService {
    pool: PgPool,
    staff_repo: Arc<StaffRepository>,
    qualification_repo: Arc<QualificationRepository>,
    catalog_repo: Arc<CatalogRepository>,
    audit: AuditRecorder,
    permissions: Arc<dyn PermissionChecker>,
}

/// Data for recording a qualification.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecordQualificationRequest {
    /// The staff member holding the qualification.
    pub staff_id: Uuid,
    /// The qualification type.
    pub qualification_type_id: Uuid,
    /// Certificate name or number as issued.
    pub name: String,
    /// Date of issue.
    pub issue_date: NaiveDate,
    /// Expiry date, if the qualification expires.
    pub expiry_date: Option<NaiveDate>,
}

impl QualificationService {
    /// Creates a new qualification service.
    pub fn new(
        pool: PgPool,
        staff_repo: Arc<StaffRepository>,
        qualification_repo: Arc<QualificationRepository>,
        catalog_repo: Arc<CatalogRepository>,
        audit: AuditRecorder,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            pool,
            staff_repo,
            qualification_repo,
            catalog_repo,
            audit,
            permissions,
        }
    }

    /// Record a new qualification in pending verification state.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        req: RecordQualificationRequest,
    ) -> AppResult<Qualification> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Qualification name cannot be empty"));
        }
        if let Some(expiry) = req.expiry_date {
            if expiry <= req.issue_date {
                return Err(AppError::validation(
                    "Expiry date must be after the issue date",
                ));
            }
        }

        self.staff_repo
            .find_by_id(req.staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff {} not found", req.staff_id)))?;
        self.catalog_repo
            .find_qualification_type(req.qualification_type_id)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Unknown qualification type {}",
                    req.qualification_type_id
                ))
            })?;

        if self
            .qualification_repo
            .find_active(req.staff_id, req.qualification_type_id, &req.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Qualification '{}' is already recorded and active",
                req.name
            )));
        }

        let mut tx = self.begin().await?;

        let qualification = self
            .qualification_repo
            .create(
                &mut tx,
                &CreateQualification {
                    staff_id: req.staff_id,
                    qualification_type_id: req.qualification_type_id,
                    name: req.name,
                    issue_date: req.issue_date,
                    expiry_date: req.expiry_date,
                },
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                "staff_qualifications",
                qualification.id,
                AuditAction::Insert,
                None,
                Some(snapshot(&qualification)?),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(
            staff_id = %qualification.staff_id,
            qualification_id = %qualification.id,
            "Qualification recorded"
        );
        Ok(qualification)
    }

    /// Verify or revoke a qualification record.
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        qualification_id: Uuid,
        status: VerificationStatus,
        note: Option<String>,
    ) -> AppResult<Qualification> {
        if status == VerificationStatus::Pending {
            return Err(AppError::validation(
                "Verification can only set verified or revoked",
            ));
        }

        let existing = self
            .qualification_repo
            .find_by_id(qualification_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Qualification {qualification_id} not found"))
            })?;

        let staff = self
            .staff_repo
            .find_by_id(existing.staff_id)
            .await?
            .ok_or_else(|| {
                AppError::integrity(format!("Holder {} vanished", existing.staff_id))
            })?;

        let allowed = self
            .permissions
            .has_permission(ctx.actor_id, Module::Qualification, Action::Verify, staff.department_id)
            .await?;
        if !allowed {
            return Err(AppError::authorization(format!(
                "Actor {} may not verify qualifications for department {}",
                ctx.actor_id, staff.department_id
            )));
        }

        let mut tx = self.begin().await?;

        let before = self
            .qualification_repo
            .find_by_id_locked(&mut tx, qualification_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Qualification {qualification_id} not found"))
            })?;

        if before.verification_status == VerificationStatus::Revoked {
            return Err(AppError::conflict("Qualification is already revoked"));
        }
        if before.verification_status == status {
            return Err(AppError::conflict(format!(
                "Qualification is already {status}"
            )));
        }

        let qualification = self
            .qualification_repo
            .update_verification(&mut tx, qualification_id, status, ctx.actor_id, note.as_deref())
            .await?;

        self.audit
            .record(
                &mut tx,
                "staff_qualifications",
                qualification.id,
                AuditAction::Update,
                Some(snapshot(&before)?),
                Some(snapshot(&qualification)?),
                ctx.actor_id,
            )
            .await?;

        self.commit(tx).await?;

        info!(
            qualification_id = %qualification.id,
            status = %status,
            verifier = %ctx.actor_id,
            "Qualification verification updated"
        );
        Ok(qualification)
    }

    /// Verified qualifications whose expiry falls within `days` of `today`.
    ///
    /// Computed against the caller-supplied date, never an ambient clock.
    pub async fn expiring_within(
        &self,
        today: NaiveDate,
        days: i64,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Qualification>> {
        if days < 0 {
            return Err(AppError::validation("Window must be non-negative"));
        }
        self.qualification_repo
            .expiring_within(today, days, page)
            .await
    }

    /// All qualification records for one staff member.
    pub async fn list_for_staff(&self, staff_id: Uuid) -> AppResult<Vec<Qualification>> {
        self.qualification_repo.list_for_staff(staff_id).await
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
