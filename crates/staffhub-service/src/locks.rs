//! Per-staff critical sections.
//!
//! Mutations touching one staff member's assignment or leave state must be
//! serialized; operations on different staff proceed in parallel. The
//! registry hands out one async mutex per staff id, with a bounded wait so
//! no caller blocks indefinitely.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use staffhub_core::{AppError, AppResult};

/// Registry of per-staff async locks.
#[derive(Debug)]
pub struct StaffLockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
    wait: Duration,
}

impl StaffLockRegistry {
    /// Create a registry with the given maximum wait per acquisition.
    pub fn new(wait: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            wait,
        }
    }

    /// Acquire the critical section for one staff member.
    ///
    /// Surfaces a retryable concurrency error when the wait bound elapses.
    pub async fn acquire(&self, staff_id: Uuid) -> AppResult<OwnedMutexGuard<()>> {
        let lock = self.locks.entry(staff_id).or_default().clone();

        tokio::time::timeout(self.wait, lock.lock_owned())
            .await
            .map_err(|_| {
                AppError::concurrency(format!(
                    "Timed out after {:?} waiting for staff {staff_id} critical section",
                    self.wait
                ))
            })
    }
}
