//! Leave entitlement with derived balance arithmetic.
//!
//! The source schema stored `remaining` as a generated column. Here it is a
//! computed accessor and every mutation goes through an invariant-checked
//! method, so stored and derived values cannot diverge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use staffhub_core::{AppError, AppResult};

/// A staff member's leave allocation for one category in one year.
///
/// Unique per (staff, category, year). `remaining` is always
/// `allocated + carried_forward - used - pending`, recomputed on read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveEntitlement {
    /// Unique entitlement identifier.
    pub id: Uuid,
    /// The staff member.
    pub staff_id: Uuid,
    /// The leave category.
    pub category_id: Uuid,
    /// Calendar year the entitlement covers.
    pub year: i32,
    /// Days allocated for the year.
    pub allocated_days: i32,
    /// Days consumed by approved applications.
    pub used_days: i32,
    /// Days reserved by pending applications.
    pub pending_days: i32,
    /// Days carried over from the prior year.
    pub carried_forward_days: i32,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LeaveEntitlement {
    /// The derived remaining balance.
    pub fn remaining(&self) -> i32 {
        self.allocated_days + self.carried_forward_days - self.used_days - self.pending_days
    }

    /// Reserve days for a newly filed application.
    ///
    /// Fails with a policy violation when the reservation would push the
    /// balance below zero, unless the category allows negative balances.
    pub fn reserve(&mut self, days: i32, allow_negative: bool) -> AppResult<()> {
        if days <= 0 {
            return Err(AppError::validation("Leave days must be positive"));
        }
        if !allow_negative && days > self.remaining() {
            return Err(AppError::policy(format!(
                "Insufficient balance: requested {days} days, {} remaining",
                self.remaining()
            )));
        }
        self.pending_days += days;
        Ok(())
    }

    /// Move days from pending to used when an application is approved.
    pub fn commit(&mut self, days: i32) -> AppResult<()> {
        if days > self.pending_days {
            return Err(AppError::integrity(format!(
                "Cannot commit {days} days: only {} pending",
                self.pending_days
            )));
        }
        self.pending_days -= days;
        self.used_days += days;
        Ok(())
    }

    /// Release reserved days when an application is rejected or cancelled.
    pub fn release(&mut self, days: i32) -> AppResult<()> {
        if days > self.pending_days {
            return Err(AppError::integrity(format!(
                "Cannot release {days} days: only {} pending",
                self.pending_days
            )));
        }
        self.pending_days -= days;
        Ok(())
    }

    /// Verify the component counters are internally consistent.
    pub fn check_consistency(&self) -> AppResult<()> {
        if self.allocated_days < 0
            || self.used_days < 0
            || self.pending_days < 0
            || self.carried_forward_days < 0
        {
            return Err(AppError::integrity(format!(
                "Negative entitlement component for staff {} category {} year {}",
                self.staff_id, self.category_id, self.year
            )));
        }
        Ok(())
    }
}

/// Data required to create a new entitlement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntitlement {
    /// The staff member.
    pub staff_id: Uuid,
    /// The leave category.
    pub category_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Days allocated.
    pub allocated_days: i32,
    /// Days carried over from the prior year.
    pub carried_forward_days: i32,
}
