//! Leave ledger operations.

pub mod service;

pub use service::{FileLeaveRequest, LeaveService, ReviewDecision};
