//! Staff entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::EmploymentStatus;

/// The canonical record for one staff member.
///
/// The department/facility/role/rank columns are current-state pointers
/// derived from the assignment ledger; they are only ever written inside
/// the same transaction that mutates the assignment history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Staff {
    /// Unique staff identifier.
    pub id: Uuid,
    /// Unique employee number.
    pub employee_no: String,
    /// Unique email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Current department (pointer into the catalog).
    pub department_id: Uuid,
    /// Current facility.
    pub facility_id: Uuid,
    /// Current role.
    pub role_id: Uuid,
    /// Current rank.
    pub rank_id: Uuid,
    /// Employment status.
    pub employment_status: EmploymentStatus,
    /// Direct supervisor, if any. The chain is kept acyclic.
    pub supervisor_id: Option<Uuid>,
    /// Date of hire.
    pub hire_date: NaiveDate,
    /// Date employment ended, for terminated staff.
    pub termination_date: Option<NaiveDate>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the staff member is actively employed.
    pub fn is_active(&self) -> bool {
        self.employment_status == EmploymentStatus::Active
    }
}

/// Data required to create a new staff row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStaff {
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
    /// Date of hire.
    pub hire_date: NaiveDate,
}
