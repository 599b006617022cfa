//! Staff registry operations.

pub mod service;

pub use service::{HireRequest, StaffService, UpdateProfileRequest};
