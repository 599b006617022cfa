//! Request context carrying the acting staff member and the request clock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Supplied by the embedding application (which owns authentication) and
/// passed into every service method so each operation knows *who* is acting
/// and *when*. Notice-period and expiry checks compute against
/// `request_time` rather than an ambient clock, which also makes them
/// deterministic under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting staff member's ID.
    pub actor_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context stamped with the current time.
    pub fn new(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            request_time: Utc::now(),
        }
    }

    /// Create a context with an explicit clock.
    pub fn at(actor_id: Uuid, request_time: DateTime<Utc>) -> Self {
        Self {
            actor_id,
            request_time,
        }
    }

    /// The civil date of the request, used as "today" in policy checks.
    pub fn today(&self) -> NaiveDate {
        self.request_time.date_naive()
    }
}
