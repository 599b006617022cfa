//! Assignment ledger entities.

pub mod model;
pub mod reason;

pub use model::{Assignment, CreateAssignment};
pub use reason::AssignmentReason;
