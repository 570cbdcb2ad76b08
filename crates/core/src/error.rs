//! Shared error model for the domain crates.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A deterministic business-rule failure.
///
/// Storage and transport failures are not represented here; those live with
/// the layer that produced them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rejected before any state change (bad field, unknown reference).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation would break a domain invariant (e.g. negative stock).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("not found")]
    NotFound,

    /// The operation collides with existing state (duplicate sku, role in
    /// use).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Failed authentication or a rejected credential.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
