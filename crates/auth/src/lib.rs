//! `stocksmith-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Token
//! encoding/decoding (HS256) and password hashing (bcrypt) are the only
//! external-library touchpoints; everything else is deterministic policy.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{authorize, AuthzError, CommandAuthorization, Principal};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256Jwt, JwtError, JwtValidator};
pub use password::{hash_password, verify_password, PasswordError};
pub use permissions::Permission;
pub use roles::{default_claims, Role, RoleName, ADMIN_ROLE, USER_ROLE};
pub use user::{ChangeRole, CreateUser, UpdateUser, User, UserStatus};
