//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use staffhub_core::error::ErrorKind;
use staffhub_core::{AppError, AppResult};

/// Kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// A row was created.
    Insert,
    /// A row was modified.
    Update,
    /// A row was removed (soft or hard).
    Delete,
}

impl AuditAction {
    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable audit log entry recording one logical mutation.
///
/// Entries are append-only and never edited. Total order is
/// (`created_at`, `seq`): the sequence breaks ties between entries
/// committed in the same instant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    /// Monotone insertion sequence.
    pub seq: i64,
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The table the mutation touched (primary table for multi-row
    /// transactions).
    pub table_name: String,
    /// The primary record's ID.
    pub record_id: Uuid,
    /// The kind of mutation.
    pub action: AuditAction,
    /// Row snapshot before the mutation (field name -> value).
    pub old_values: Option<serde_json::Value>,
    /// Row snapshot after the mutation.
    pub new_values: Option<serde_json::Value>,
    /// The staff member who performed the action.
    pub actor_id: Uuid,
    /// When the mutation was committed.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    /// The table the mutation touched.
    pub table_name: String,
    /// The primary record's ID.
    pub record_id: Uuid,
    /// The kind of mutation.
    pub action: AuditAction,
    /// Row snapshot before the mutation.
    pub old_values: Option<serde_json::Value>,
    /// Row snapshot after the mutation.
    pub new_values: Option<serde_json::Value>,
    /// The acting staff member.
    pub actor_id: Uuid,
}

/// Serialize a row into an audit snapshot payload.
///
/// Snapshot failure means the audit entry cannot be written, which makes
/// the whole transaction an integrity fault rather than a silent gap in
/// the trail.
pub fn snapshot<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::with_source(ErrorKind::Integrity, "Failed to snapshot row for audit", e))
}
