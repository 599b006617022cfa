//! Audit recorder: one entry per logical transaction.

use std::sync::Arc;

use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use staffhub_core::AppResult;
use staffhub_database::repositories::AuditLogRepository;
use staffhub_entity::audit::{AuditAction, AuditEntry, CreateAuditEntry};

/// Appends audit entries inside the caller's open transaction.
///
/// Every mutating service operation calls [`AuditRecorder::record`] exactly
/// once before committing, with the before/after snapshots of every row the
/// transaction touched. Because the append rides the same transaction, an
/// audit entry can never exist without its data change, nor a data change
/// without its entry. Append failure surfaces as an integrity fault and
/// rolls the whole transaction back.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    audit_repo: Arc<AuditLogRepository>,
}

impl AuditRecorder {
    /// Create a new audit recorder.
    pub fn new(audit_repo: Arc<AuditLogRepository>) -> Self {
        Self { audit_repo }
    }

    /// Append one audit entry inside the caller's transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        conn: &mut PgConnection,
        table_name: &str,
        record_id: Uuid,
        action: AuditAction,
        old_values: Option<serde_json::Value>,
        new_values: Option<serde_json::Value>,
        actor_id: Uuid,
    ) -> AppResult<AuditEntry> {
        let entry = self
            .audit_repo
            .append(
                conn,
                &CreateAuditEntry {
                    table_name: table_name.to_string(),
                    record_id,
                    action,
                    old_values,
                    new_values,
                    actor_id,
                },
            )
            .await?;

        debug!(
            table = table_name,
            record_id = %record_id,
            action = %action,
            actor_id = %actor_id,
            "Audit entry recorded"
        );
        Ok(entry)
    }
}
