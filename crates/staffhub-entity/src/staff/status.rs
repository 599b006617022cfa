//! Employment status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Employment status of a staff member.
///
/// Staff are never physically deleted; the lifecycle is expressed entirely
/// through this status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    /// Actively employed; may file leave and be reassigned.
    Active,
    /// Temporarily not working (e.g. unpaid sabbatical).
    Inactive,
    /// Employment ended; current assignment closed.
    Terminated,
    /// Suspended pending investigation; leave operations blocked.
    Suspended,
}

impl EmploymentStatus {
    /// Whether leave may be filed or approved in this status.
    pub fn can_take_leave(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the staff member can be reassigned in this status.
    pub fn can_be_reassigned(&self) -> bool {
        matches!(self, Self::Active | Self::Inactive)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Terminated => "terminated",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmploymentStatus {
    type Err = staffhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "terminated" => Ok(Self::Terminated),
            "suspended" => Ok(Self::Suspended),
            _ => Err(staffhub_core::AppError::validation(format!(
                "Invalid employment status: '{s}'. Expected one of: active, inactive, terminated, suspended"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_allowed_only_when_active() {
        assert!(EmploymentStatus::Active.can_take_leave());
        assert!(!EmploymentStatus::Suspended.can_take_leave());
        assert!(!EmploymentStatus::Terminated.can_take_leave());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "active".parse::<EmploymentStatus>().unwrap(),
            EmploymentStatus::Active
        );
        assert_eq!(
            "TERMINATED".parse::<EmploymentStatus>().unwrap(),
            EmploymentStatus::Terminated
        );
        assert!("retired".parse::<EmploymentStatus>().is_err());
    }
}
