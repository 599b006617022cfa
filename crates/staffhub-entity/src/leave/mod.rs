//! Leave ledger entities: category policy, per-year entitlements, and the
//! application state machine.

pub mod application;
pub mod category;
pub mod entitlement;
pub mod status;

pub use application::{CreateApplication, LeaveApplication};
pub use category::LeaveCategory;
pub use entitlement::{CreateEntitlement, LeaveEntitlement};
pub use status::ApplicationStatus;
