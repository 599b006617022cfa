//! Leave application status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a leave application.
///
/// The only legal transitions are out of `Pending`; the other three states
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "leave_application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Filed and awaiting review; days are reserved as pending.
    Pending,
    /// Approved; days moved from pending to used.
    Approved,
    /// Rejected by a reviewer; pending days released.
    Rejected,
    /// Cancelled by the applicant (or by termination); pending days released.
    Cancelled,
}

impl ApplicationStatus {
    /// Whether no further transition is allowed from this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether a transition to `to` is legal.
    pub fn can_transition(&self, to: ApplicationStatus) -> bool {
        matches!(self, Self::Pending) && to != Self::Pending
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = staffhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(staffhub_core::AppError::validation(format!(
                "Invalid application status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        let p = ApplicationStatus::Pending;
        assert!(p.can_transition(ApplicationStatus::Approved));
        assert!(p.can_transition(ApplicationStatus::Rejected));
        assert!(p.can_transition(ApplicationStatus::Cancelled));
        assert!(!p.can_transition(ApplicationStatus::Pending));
    }

    #[test]
    fn test_terminal_states() {
        for s in [
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
            ApplicationStatus::Cancelled,
        ] {
            assert!(s.is_terminal());
            assert!(!s.can_transition(ApplicationStatus::Pending));
            assert!(!s.can_transition(ApplicationStatus::Approved));
        }
    }
}
