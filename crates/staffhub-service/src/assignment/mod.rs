//! Assignment ledger operations.

pub mod service;

pub use service::{AssignmentService, ReassignRequest};
