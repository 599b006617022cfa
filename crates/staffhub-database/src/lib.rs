//! # staffhub-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all StaffHub stores.
//!
//! Read methods execute against the shared pool. Write methods take a
//! `&mut PgConnection` so that the service layer owns the transaction
//! boundary: every logical operation is one transaction, and the audit
//! append rides inside it.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
