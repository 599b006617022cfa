//! Assignment reason enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why an assignment record was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentReason {
    /// The first assignment created at hire.
    Hire,
    /// Lateral move to a different department or facility.
    Transfer,
    /// Move to a higher rank.
    Promotion,
    /// Move to a lower rank.
    Demotion,
    /// Placement adjusted as part of a status change.
    StatusChange,
    /// Closing record written at termination.
    Termination,
}

impl AssignmentReason {
    /// Return the reason as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hire => "hire",
            Self::Transfer => "transfer",
            Self::Promotion => "promotion",
            Self::Demotion => "demotion",
            Self::StatusChange => "status_change",
            Self::Termination => "termination",
        }
    }
}

impl fmt::Display for AssignmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssignmentReason {
    type Err = staffhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hire" => Ok(Self::Hire),
            "transfer" => Ok(Self::Transfer),
            "promotion" => Ok(Self::Promotion),
            "demotion" => Ok(Self::Demotion),
            "status_change" => Ok(Self::StatusChange),
            "termination" => Ok(Self::Termination),
            _ => Err(staffhub_core::AppError::validation(format!(
                "Invalid assignment reason: '{s}'"
            ))),
        }
    }
}
