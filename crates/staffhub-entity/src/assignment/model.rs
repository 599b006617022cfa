//! Assignment record entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::reason::AssignmentReason;

/// One row in a staff member's placement history.
///
/// History is append-only. For a given staff member at most one record is
/// current (`is_current` and no end date); opening a new current record
/// closes the previous one in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    /// Unique assignment identifier.
    pub id: Uuid,
    /// The staff member this assignment belongs to.
    pub staff_id: Uuid,
    /// Assigned department.
    pub department_id: Uuid,
    /// Assigned facility.
    pub facility_id: Uuid,
    /// Assigned role.
    pub role_id: Uuid,
    /// Assigned rank.
    pub rank_id: Uuid,
    /// First day of the assignment.
    pub start_date: NaiveDate,
    /// Last day of the assignment; `None` while open.
    pub end_date: Option<NaiveDate>,
    /// Why the assignment was opened.
    pub reason: AssignmentReason,
    /// Whether this is the staff member's present assignment.
    pub is_current: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Whether the assignment is still open (no end date).
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Data required to open a new assignment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignment {
    /// The staff member being placed.
    pub staff_id: Uuid,
    /// Department to assign.
    pub department_id: Uuid,
    /// Facility to assign.
    pub facility_id: Uuid,
    /// Role to assign.
    pub role_id: Uuid,
    /// Rank to assign.
    pub rank_id: Uuid,
    /// First day of the assignment.
    pub start_date: NaiveDate,
    /// Why the assignment is opened.
    pub reason: AssignmentReason,
}
