//! Reference catalog entities: organizational lookup sets that are
//! read-mostly and immutable during a ledger transaction.

pub mod model;

pub use model::{Department, Facility, QualificationType, Rank, StaffRole};
