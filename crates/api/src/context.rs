use stocksmith_auth::{Permission, RoleName};
use stocksmith_core::UserId;

/// Principal context for a request (authenticated identity + resolved
/// permissions).
///
/// Built by the auth middleware from the token subject and the current role
/// store state, so a stale token never grants more than the user's current
/// role does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    role: RoleName,
    permissions: Vec<Permission>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, role: RoleName, permissions: Vec<Permission>) -> Self {
        Self {
            user_id,
            role,
            permissions,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> &RoleName {
        &self.role
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}
