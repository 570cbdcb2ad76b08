use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{DomainError, DomainResult, RoleId};

use crate::Permission;

/// Built-in role names. These roles always exist and are protected from
/// deletion and renaming.
pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

/// Role name used for RBAC.
///
/// Names are intentionally opaque strings at this layer; mapping names to
/// permissions is done by the policy layer (see [`default_claims`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self.as_str(), ADMIN_ROLE | USER_ROLE)
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Managed role: a name plus the permission claims it grants.
///
/// # Invariants
/// - The built-in `admin` and `user` roles cannot be renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
    pub claims: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn create(
        id: RoleId,
        name: impl Into<Cow<'static, str>>,
        claims: Vec<Permission>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = RoleName::new(name.into().trim().to_lowercase());
        if name.as_str().is_empty() {
            return Err(DomainError::validation("role name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            claims,
            created_at: occurred_at,
            updated_at: occurred_at,
        })
    }

    /// Built-in role with its default claims.
    pub fn built_in(name: &'static str, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: RoleId::new(),
            name: RoleName::new(name),
            claims: default_claims(name),
            created_at: occurred_at,
            updated_at: occurred_at,
        }
    }

    pub fn rename(&mut self, name: &str, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        if self.name.is_built_in() {
            return Err(DomainError::invariant(format!(
                "built-in role '{}' cannot be renamed",
                self.name
            )));
        }
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(DomainError::validation("role name cannot be empty"));
        }
        self.name = RoleName::new(name);
        self.updated_at = occurred_at;
        Ok(())
    }

    pub fn set_claims(&mut self, claims: Vec<Permission>, occurred_at: DateTime<Utc>) {
        self.claims = claims;
        self.updated_at = occurred_at;
    }

    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.name.is_built_in() {
            return Err(DomainError::invariant(format!(
                "built-in role '{}' cannot be deleted",
                self.name
            )));
        }
        Ok(())
    }
}

/// Default role→permission mapping.
///
/// `admin` gets the wildcard; `user` gets day-to-day shop permissions.
/// Unknown roles get nothing until claims are granted explicitly.
pub fn default_claims(role_name: &str) -> Vec<Permission> {
    match role_name {
        ADMIN_ROLE => vec![Permission::new("*")],
        USER_ROLE => vec![
            Permission::new("products.read"),
            Permission::new("categories.read"),
            Permission::new("locations.read"),
            Permission::new("movements.read"),
            Permission::new("movements.write"),
            Permission::new("todos.read"),
            Permission::new("todos.write"),
            Permission::new("dashboard.read"),
            Permission::new("chat.use"),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_roles_refuse_rename() {
        let mut role = Role::built_in(ADMIN_ROLE, Utc::now());
        let err = role.rename("superadmin", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(role.name.as_str(), "admin");
    }

    #[test]
    fn built_in_roles_refuse_deletion() {
        let role = Role::built_in(USER_ROLE, Utc::now());
        assert!(role.ensure_deletable().is_err());
    }

    #[test]
    fn custom_roles_can_be_renamed_and_deleted() {
        let mut role = Role::create(
            RoleId::new(),
            "Warehouse",
            vec![Permission::new("movements.write")],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(role.name.as_str(), "warehouse");

        role.rename("Stockroom", Utc::now()).unwrap();
        assert_eq!(role.name.as_str(), "stockroom");
        assert!(role.ensure_deletable().is_ok());
    }

    #[test]
    fn admin_claims_are_wildcard() {
        let claims = default_claims(ADMIN_ROLE);
        assert!(claims.iter().any(|p| p.is_wildcard()));
    }

    #[test]
    fn user_claims_exclude_administration() {
        let claims = default_claims(USER_ROLE);
        assert!(!claims.iter().any(|p| p.as_str().starts_with("users.")));
        assert!(!claims.iter().any(|p| p.as_str().starts_with("roles.")));
    }
}
