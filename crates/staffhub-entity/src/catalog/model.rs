//! Reference catalog row models.
//!
//! Catalog CRUD lives outside the ledger; these models exist so that
//! foreign references can be resolved and validated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An organizational department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: Uuid,
    /// Short unique code (e.g. `"ICU"`).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// When the department was created.
    pub created_at: DateTime<Utc>,
}

/// A physical facility or site.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facility {
    /// Unique facility identifier.
    pub id: Uuid,
    /// Short unique code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// When the facility was created.
    pub created_at: DateTime<Utc>,
}

/// A job role (what the staff member does).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffRole {
    /// Unique role identifier.
    pub id: Uuid,
    /// Short unique code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

/// A rank (seniority grade within a role).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rank {
    /// Unique rank identifier.
    pub id: Uuid,
    /// Short unique code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Seniority level; higher is more senior.
    pub level: i32,
    /// When the rank was created.
    pub created_at: DateTime<Utc>,
}

/// A type of qualification or certification staff can hold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QualificationType {
    /// Unique qualification type identifier.
    pub id: Uuid,
    /// Short unique code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// When the type was created.
    pub created_at: DateTime<Utc>,
}
