//! Leave application entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ApplicationStatus;

/// A request for leave over a date range.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveApplication {
    /// Unique application identifier.
    pub id: Uuid,
    /// The applicant.
    pub staff_id: Uuid,
    /// The leave category applied under.
    pub category_id: Uuid,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Total leave days, computed per category policy at filing time.
    pub total_days: i32,
    /// Current state.
    pub status: ApplicationStatus,
    /// Applicant's stated reason.
    pub reason: Option<String>,
    /// Who decided the application, once decided.
    pub approver_id: Option<Uuid>,
    /// When the decision was made.
    pub decided_at: Option<DateTime<Utc>>,
    /// Reviewer's reason, required on rejection.
    pub rejection_reason: Option<String>,
    /// When the application was filed.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LeaveApplication {
    /// The entitlement year this application draws from.
    pub fn entitlement_year(&self) -> i32 {
        use chrono::Datelike;
        self.start_date.year()
    }
}

/// Data required to file a new application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplication {
    /// The applicant.
    pub staff_id: Uuid,
    /// The leave category.
    pub category_id: Uuid,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Computed total days.
    pub total_days: i32,
    /// Applicant's stated reason.
    pub reason: Option<String>,
}
