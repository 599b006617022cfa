//! Qualification verification status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compliance state of a qualification record.
///
/// Expiry is intentionally not a status value: it is derived from the
/// expiry date against the caller's clock, so a stale stored flag can never
/// contradict the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Recorded but not yet checked by a verifier.
    Pending,
    /// Confirmed authentic by a verifier.
    Verified,
    /// Rejected at verification or revoked afterwards.
    Revoked,
}

impl VerificationStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = staffhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" | "revoked" => Ok(Self::Revoked),
            _ => Err(staffhub_core::AppError::validation(format!(
                "Invalid verification status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_parses_as_revoked() {
        assert_eq!(
            "rejected".parse::<VerificationStatus>().unwrap(),
            VerificationStatus::Revoked
        );
    }
}
