//! # staffhub-service
//!
//! Business logic service layer for the StaffHub ledger. Each service
//! orchestrates repositories to implement one component of the ledger:
//! staff registry, assignment ledger, leave ledger, qualification tracker,
//! and the audit recorder every mutation writes through.
//!
//! Services follow constructor injection; dependencies are provided at
//! construction time via `Arc` references. Every mutating operation is
//! one database transaction containing exactly one audit append, executed
//! under the target staff member's critical section.

pub mod assignment;
pub mod audit;
pub mod context;
pub mod leave;
pub mod locks;
pub mod qualification;
pub mod report;
pub mod retry;
pub mod staff;

pub use assignment::{AssignmentService, ReassignRequest};
pub use audit::AuditRecorder;
pub use context::RequestContext;
pub use leave::{FileLeaveRequest, LeaveService, ReviewDecision};
pub use locks::StaffLockRegistry;
pub use qualification::{QualificationService, RecordQualificationRequest};
pub use report::ReportService;
pub use retry::RetryPolicy;
pub use staff::{HireRequest, StaffService, UpdateProfileRequest};
