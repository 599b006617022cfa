//! Read-only reporting projections.

pub mod service;

pub use service::{LeaveBalanceLine, ReportService, RosterEntry};
