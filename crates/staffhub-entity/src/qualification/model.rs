//! Qualification record entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::VerificationStatus;

/// A certification held by a staff member.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Qualification {
    /// Unique qualification record identifier.
    pub id: Uuid,
    /// The staff member holding the qualification.
    pub staff_id: Uuid,
    /// The qualification type (pointer into the catalog).
    pub qualification_type_id: Uuid,
    /// Certificate name or number as issued.
    pub name: String,
    /// Date of issue.
    pub issue_date: NaiveDate,
    /// Expiry date; `None` for qualifications that never expire.
    pub expiry_date: Option<NaiveDate>,
    /// Verification state.
    pub verification_status: VerificationStatus,
    /// Who verified or revoked the record.
    pub verifier_id: Option<Uuid>,
    /// When verification happened.
    pub verified_at: Option<DateTime<Utc>>,
    /// Verifier's note.
    pub note: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Qualification {
    /// Whether the qualification has expired as of `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|d| d < today)
    }

    /// Whether the record counts for compliance as of `today`: verified and
    /// not expired.
    pub fn is_valid(&self, today: NaiveDate) -> bool {
        self.verification_status == VerificationStatus::Verified && !self.is_expired(today)
    }

    /// Whether the expiry date falls within `(today, today + days]`.
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry >= today && (expiry - today).num_days() <= days,
            None => false,
        }
    }
}

/// Data required to record a new qualification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQualification {
    /// The staff member.
    pub staff_id: Uuid,
    /// The qualification type.
    pub qualification_type_id: Uuid,
    /// Certificate name or number.
    pub name: String,
    /// Date of issue.
    pub issue_date: NaiveDate,
    /// Expiry date, if the qualification expires.
    pub expiry_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn qualification(
        status: VerificationStatus,
        expiry: Option<NaiveDate>,
    ) -> Qualification {
        Qualification {
            id: Uuid::now_v7(),
            staff_id: Uuid::now_v7(),
            qualification_type_id: Uuid::now_v7(),
            name: "BLS-2024-001".into(),
            issue_date: d(2023, 1, 1),
            expiry_date: expiry,
            verification_status: status,
            verifier_id: None,
            verified_at: None,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expired_record_is_not_valid_even_when_verified() {
        let q = qualification(VerificationStatus::Verified, Some(d(2024, 1, 1)));
        assert!(q.is_expired(d(2024, 6, 1)));
        assert!(!q.is_valid(d(2024, 6, 1)));
        assert!(q.is_valid(d(2023, 12, 31)));
    }

    #[test]
    fn test_expiry_on_the_day_still_valid() {
        let q = qualification(VerificationStatus::Verified, Some(d(2024, 6, 1)));
        assert!(!q.is_expired(d(2024, 6, 1)));
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let q = qualification(VerificationStatus::Verified, None);
        assert!(!q.is_expired(d(2099, 1, 1)));
        assert!(!q.expires_within(d(2024, 1, 1), 365));
    }

    #[test]
    fn test_expires_within_window() {
        let q = qualification(VerificationStatus::Verified, Some(d(2024, 6, 15)));
        assert!(q.expires_within(d(2024, 6, 1), 30));
        assert!(!q.expires_within(d(2024, 6, 1), 10));
        // Already past: not "expiring", it has expired.
        assert!(!q.expires_within(d(2024, 7, 1), 30));
    }

    #[test]
    fn test_pending_is_not_valid() {
        let q = qualification(VerificationStatus::Pending, None);
        assert!(!q.is_valid(d(2024, 1, 1)));
    }
}
