//! User entity for identity management.
//!
//! # Invariants
//! - A user holds exactly one role.
//! - Users cannot change their own role (escalation guard).
//! - Suspended users cannot authenticate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{DomainError, DomainResult, UserId};

use crate::RoleName;

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// User is active and can authenticate/transact.
    #[default]
    Active,
    /// User is suspended and cannot authenticate.
    Suspended,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// User account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    /// Opaque bcrypt hash; see [`crate::password`].
    pub password_hash: String,
    pub role: RoleName,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command: create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: RoleName,
    pub occurred_at: DateTime<Utc>,
}

/// Command: update profile fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: replace the user's single role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRole {
    pub user_id: UserId,
    pub role: RoleName,
    /// The actor performing this operation (for the self-escalation check).
    pub actor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

impl User {
    pub fn create(cmd: CreateUser) -> DomainResult<Self> {
        let email = normalize_email(&cmd.email)?;
        let display_name = cmd.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        if cmd.password_hash.is_empty() {
            return Err(DomainError::validation("password hash cannot be empty"));
        }

        Ok(Self {
            id: cmd.user_id,
            email,
            display_name,
            password_hash: cmd.password_hash,
            role: cmd.role,
            status: UserStatus::Active,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    pub fn update(&mut self, cmd: UpdateUser) -> DomainResult<()> {
        if let Some(email) = cmd.email {
            self.email = normalize_email(&email)?;
        }
        if let Some(display_name) = cmd.display_name {
            let display_name = display_name.trim().to_string();
            if display_name.is_empty() {
                return Err(DomainError::validation("display name cannot be empty"));
            }
            self.display_name = display_name;
        }
        if let Some(password_hash) = cmd.password_hash {
            if password_hash.is_empty() {
                return Err(DomainError::validation("password hash cannot be empty"));
            }
            self.password_hash = password_hash;
        }
        self.updated_at = cmd.occurred_at;
        Ok(())
    }

    pub fn change_role(&mut self, cmd: ChangeRole) -> DomainResult<()> {
        // Escalation guard: nobody edits their own role, admins included.
        if cmd.actor_id == self.id {
            return Err(DomainError::invariant("users cannot change their own role"));
        }
        self.ensure_not_suspended()?;
        self.role = cmd.role;
        self.updated_at = cmd.occurred_at;
        Ok(())
    }

    pub fn suspend(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        if self.status == UserStatus::Suspended {
            return Err(DomainError::invariant("user already suspended"));
        }
        self.status = UserStatus::Suspended;
        self.updated_at = occurred_at;
        Ok(())
    }

    pub fn activate(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        if self.status == UserStatus::Active {
            return Err(DomainError::invariant("user already active"));
        }
        self.status = UserStatus::Active;
        self.updated_at = occurred_at;
        Ok(())
    }

    pub fn can_authenticate(&self) -> bool {
        self.status == UserStatus::Active
    }

    fn ensure_not_suspended(&self) -> DomainResult<()> {
        if self.status == UserStatus::Suspended {
            return Err(DomainError::invariant("user is suspended"));
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_cmd() -> CreateUser {
        CreateUser {
            user_id: UserId::new(),
            email: "Alice@Example.com".to_string(),
            display_name: "Alice Smith".to_string(),
            password_hash: "$2b$12$fakehashfortests".to_string(),
            role: RoleName::new("user"),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn create_user_normalizes_email() {
        let user = User::create(create_cmd()).unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn create_user_invalid_email() {
        let mut cmd = create_cmd();
        cmd.email = "invalid-email".to_string();
        assert!(User::create(cmd).is_err());
    }

    #[test]
    fn self_role_change_is_blocked() {
        let mut user = User::create(create_cmd()).unwrap();
        let err = user
            .change_role(ChangeRole {
                user_id: user.id,
                role: RoleName::new("admin"),
                actor_id: user.id,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(user.role.as_str(), "user");
    }

    #[test]
    fn role_change_by_another_actor_succeeds() {
        let mut user = User::create(create_cmd()).unwrap();
        user.change_role(ChangeRole {
            user_id: user.id,
            role: RoleName::new("admin"),
            actor_id: UserId::new(),
            occurred_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(user.role.as_str(), "admin");
    }

    #[test]
    fn suspended_user_cannot_authenticate_or_change_role() {
        let mut user = User::create(create_cmd()).unwrap();
        user.suspend(Utc::now()).unwrap();
        assert!(!user.can_authenticate());

        let err = user
            .change_role(ChangeRole {
                user_id: user.id,
                role: RoleName::new("admin"),
                actor_id: UserId::new(),
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("suspended"));
    }

    #[test]
    fn suspend_then_activate_round_trip() {
        let mut user = User::create(create_cmd()).unwrap();
        user.suspend(Utc::now()).unwrap();
        assert!(user.suspend(Utc::now()).is_err());

        user.activate(Utc::now()).unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.activate(Utc::now()).is_err());
    }
}
