//! Permission seam for the external identity/permission service.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Ledger modules an actor can be granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    /// Staff registry operations.
    Staff,
    /// Assignment ledger operations.
    Assignment,
    /// Leave ledger operations.
    Leave,
    /// Qualification tracker operations.
    Qualification,
}

impl Module {
    /// Return the module as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Assignment => "assignment",
            Self::Leave => "leave",
            Self::Qualification => "qualification",
        }
    }
}

/// Actions checked against the permission matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create or mutate records.
    Write,
    /// Approve or reject a pending request.
    Approve,
    /// Verify a qualification record.
    Verify,
}

impl Action {
    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Approve => "approve",
            Self::Verify => "verify",
        }
    }
}

/// Authorization decisions are delegated to the embedding application.
///
/// The ledger asks one question: may `actor` perform `action` on `module`
/// for staff in `department`? How the answer is derived (role matrix,
/// supervisor relationship, RBAC service) is the collaborator's concern.
#[async_trait]
pub trait PermissionChecker: Send + Sync + 'static {
    /// Return whether the actor holds the permission.
    async fn has_permission(
        &self,
        actor_id: Uuid,
        module: Module,
        action: Action,
        department_id: Uuid,
    ) -> AppResult<bool>;
}

/// Permission checker that grants everything. For tests and trusted
/// embedded deployments where the caller pre-authorizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn has_permission(
        &self,
        _actor_id: Uuid,
        _module: Module,
        _action: Action,
        _department_id: Uuid,
    ) -> AppResult<bool> {
        Ok(true)
    }
}
