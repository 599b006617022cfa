//! # staffhub-entity
//!
//! Domain entity models for the StaffHub ledger. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.
//!
//! Derived values (leave balance, qualification expiry) are computed
//! accessors on the entity, never stored fields, so no caller can write a
//! value that contradicts its inputs.

pub mod assignment;
pub mod audit;
pub mod catalog;
pub mod leave;
pub mod qualification;
pub mod staff;
