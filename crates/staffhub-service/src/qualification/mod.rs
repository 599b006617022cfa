//! Qualification tracker operations.

pub mod service;

pub use service::{QualificationService, RecordQualificationRequest};
