//! API-side authorization guard for commands.
//!
//! Enforces permissions at the handler boundary (before any store access),
//! keeping domain crates and infra auth-agnostic.

use stocksmith_auth::{authorize, AuthzError, CommandAuthorization, Principal};

use crate::context::PrincipalContext;

/// Check authorization for a command in the current request context.
///
/// Intended to be called **before** the command touches any state.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let principal = Principal {
        user_id: principal.user_id(),
        role: principal.role().clone(),
        permissions: principal.permissions().to_vec(),
    };

    for perm in command.required_permissions() {
        authorize(&principal, perm)?;
    }

    Ok(())
}
