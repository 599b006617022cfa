//! Reporting projections over the ledger stores.
//!
//! Pure queries with no side effects, equivalent to reporting views: a
//! roster with current assignments, per-staff leave summaries with derived
//! balances, and qualification expiry alerts.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use staffhub_core::types::pagination::{PageRequest, PageResponse};
use staffhub_core::AppResult;
use staffhub_database::repositories::{
    AssignmentRepository, EntitlementRepository, QualificationRepository, StaffRepository,
};
use staffhub_entity::assignment::Assignment;
use staffhub_entity::qualification::Qualification;
use staffhub_entity::staff::Staff;

/// One roster line: a staff member with their present placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The staff member.
    pub staff: Staff,
    /// Their current assignment; absent only for terminated staff.
    pub current_assignment: Option<Assignment>,
}

/// One leave-summary line with the derived remaining balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBalanceLine {
    /// The leave category.
    pub category_id: Uuid,
    /// Days allocated for the year.
    pub allocated_days: i32,
    /// Days consumed by approved applications.
    pub used_days: i32,
    /// Days reserved by pending applications.
    pub pending_days: i32,
    /// Days carried over from the prior year.
    pub carried_forward_days: i32,
    /// The derived remaining balance.
    pub remaining_days: i32,
}

/// Read-only reporting queries.
#[derive(Debug, Clone)]
pub struct ReportService {
    staff_repo: Arc<StaffRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    entitlement_repo: Arc<EntitlementRepository>,
    qualification_repo: Arc<QualificationRepository>,
}

impl ReportService {
    /// Creates a new report service.
    pub fn new(
        staff_repo: Arc<StaffRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        entitlement_repo: Arc<EntitlementRepository>,
        qualification_repo: Arc<QualificationRepository>,
    ) -> Self {
        Self {
            staff_repo,
            assignment_repo,
            entitlement_repo,
            qualification_repo,
        }
    }

    /// Staff roster with current assignments.
    pub async fn roster(&self, page: &PageRequest) -> AppResult<PageResponse<RosterEntry>> {
        let staff_page = self.staff_repo.find_all(page).await?;

        let mut entries = Vec::with_capacity(staff_page.items.len());
        for staff in staff_page.items {
            let current_assignment = self.assignment_repo.current_for_staff(staff.id).await?;
            entries.push(RosterEntry {
                staff,
                current_assignment,
            });
        }

        Ok(PageResponse::new(
            entries,
            staff_page.page,
            staff_page.page_size,
            staff_page.total_items,
        ))
    }

    /// Per-category leave balances for one staff member and year.
    pub async fn leave_summary(
        &self,
        staff_id: Uuid,
        year: i32,
    ) -> AppResult<Vec<LeaveBalanceLine>> {
        let entitlements = self.entitlement_repo.for_staff_year(staff_id, year).await?;
        Ok(entitlements
            .into_iter()
            .map(|e| LeaveBalanceLine {
                category_id: e.category_id,
                allocated_days: e.allocated_days,
                used_days: e.used_days,
                pending_days: e.pending_days,
                carried_forward_days: e.carried_forward_days,
                remaining_days: e.remaining(),
            })
            .collect())
    }

    /// Verified qualifications expiring within the window.
    pub async fn expiry_alerts(
        &self,
        today: NaiveDate,
        days: i64,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Qualification>> {
        self.qualification_repo
            .expiring_within(today, days, page)
            .await
    }
}
