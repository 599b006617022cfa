//! # StaffHub
//!
//! Staff lifecycle and leave-balance ledger. Enforces what an HR schema
//! can only declare: one current assignment per staff member,
//! always-consistent leave balances, a tamper-evident audit trail, and
//! qualification expiry tracking.
//!
//! This facade crate re-exports the workspace layers. Embedding
//! applications construct a [`staffhub_database::DatabasePool`], run
//! migrations, and wire the services with their own permission checker and
//! holiday calendar.

pub use staffhub_core as core;
pub use staffhub_database as database;
pub use staffhub_entity as entity;
pub use staffhub_service as service;

pub use staffhub_core::{AppError, AppResult};
pub use staffhub_database::DatabasePool;
pub use staffhub_service::{
    AssignmentService, AuditRecorder, LeaveService, QualificationService, ReportService,
    RequestContext, StaffLockRegistry, StaffService,
};
