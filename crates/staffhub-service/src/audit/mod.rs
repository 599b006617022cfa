//! Audit recording for every mutating operation.

pub mod recorder;

pub use recorder::AuditRecorder;
