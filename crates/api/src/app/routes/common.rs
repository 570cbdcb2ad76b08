use axum::http::StatusCode;

use stocksmith_auth::{CommandAuthorization, Permission};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Small helper wrapper to associate required permissions with an operation.
pub struct CmdAuth {
    pub required: Vec<Permission>,
}

impl CommandAuthorization for CmdAuth {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

/// Guard a handler on a single permission; returns the ready-made 403
/// response on denial.
pub fn require(
    principal: &PrincipalContext,
    permission: &str,
) -> Result<(), axum::response::Response> {
    let guard = CmdAuth {
        required: vec![Permission::new(permission.to_string())],
    };
    crate::authz::authorize_command(principal, &guard)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}
