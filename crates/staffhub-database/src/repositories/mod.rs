//! Concrete repository implementations, one per store.

pub mod application;
pub mod assignment;
pub mod audit;
pub mod catalog;
pub mod entitlement;
pub mod qualification;
pub mod staff;

pub use application::ApplicationRepository;
pub use assignment::AssignmentRepository;
pub use audit::AuditLogRepository;
pub use catalog::CatalogRepository;
pub use entitlement::EntitlementRepository;
pub use qualification::QualificationRepository;
pub use staff::StaffRepository;
