//! Ledger concurrency and traversal policy configuration.

use serde::{Deserialize, Serialize};

/// Knobs governing the per-staff critical section and bounded retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Maximum time to wait for a staff member's critical section, in
    /// milliseconds, before surfacing a lock timeout.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
    /// Maximum number of internal retries for retryable concurrency errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff between retries in milliseconds (linear: attempt * base).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Upper bound on supervisor-chain traversal. Walks longer than this
    /// indicate corrupt data and abort with an integrity fault.
    #[serde(default = "default_supervisor_chain_limit")]
    pub supervisor_chain_limit: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            lock_wait_ms: default_lock_wait_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            supervisor_chain_limit: default_supervisor_chain_limit(),
        }
    }
}

fn default_lock_wait_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    50
}

fn default_supervisor_chain_limit() -> u32 {
    1_000
}
