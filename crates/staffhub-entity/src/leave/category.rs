//! Leave category policy row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A leave category and its policy.
///
/// Categories are reference data: immutable during normal ledger operation.
/// Every policy check the ledger performs reads from this row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveCategory {
    /// Unique category identifier.
    pub id: Uuid,
    /// Short unique code (e.g. `"AL"` for annual leave).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Whether leave in this category is paid.
    pub is_paid: bool,
    /// Days allocated per year under this category.
    pub annual_cap_days: i32,
    /// Minimum days of notice before the leave starts.
    pub min_notice_days: i32,
    /// Maximum consecutive days per application; 0 means unlimited.
    pub max_consecutive_days: i32,
    /// Whether unused days carry into the next year.
    pub carry_forward: bool,
    /// Whether totals count business days (weekends/holidays excluded)
    /// rather than calendar days.
    pub business_days_only: bool,
    /// Whether the balance may go below zero.
    pub allow_negative_balance: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

impl LeaveCategory {
    /// Whether an application of `total_days` exceeds the consecutive-day
    /// limit for this category.
    pub fn exceeds_consecutive_limit(&self, total_days: i32) -> bool {
        self.max_consecutive_days > 0 && total_days > self.max_consecutive_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(max_consecutive_days: i32) -> LeaveCategory {
        LeaveCategory {
            id: Uuid::now_v7(),
            code: "AL".into(),
            name: "Annual Leave".into(),
            is_paid: true,
            annual_cap_days: 21,
            min_notice_days: 3,
            max_consecutive_days,
            carry_forward: true,
            business_days_only: true,
            allow_negative_balance: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_consecutive_limit() {
        assert!(category(5).exceeds_consecutive_limit(6));
        assert!(!category(5).exceeds_consecutive_limit(5));
    }

    #[test]
    fn test_zero_means_unlimited() {
        assert!(!category(0).exceeds_consecutive_limit(365));
    }
}
