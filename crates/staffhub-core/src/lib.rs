//! # staffhub-core
//!
//! Core crate for the StaffHub ledger. Contains the unified error system,
//! configuration schemas, pagination types, and the trait seams through
//! which external collaborators (identity/permission service, holiday
//! calendar) are injected.
//!
//! This crate has **no** internal dependencies on other StaffHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
