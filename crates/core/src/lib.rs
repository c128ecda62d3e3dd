//! Shared primitives for all Rust crates in Rolegate.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::convert::Infallible;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::UserIdentity;

/// Result type used across Rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Identifier of a user account, shared by the session layer and the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a user identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| AppError::Validation(format!("invalid user id '{value}'")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl TryFrom<&str> for UserId {
    type Error = AppError;

    fn try_from(value: &str) -> AppResult<Self> {
        Self::parse(value)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Name of the offending field as sent by the caller.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for one field.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Uniqueness rule broken by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Role slug already taken.
    DuplicateSlug,
    /// Permission key already registered.
    DuplicateKey,
    /// User email already registered.
    DuplicateEmail,
    /// Bundle name already taken.
    DuplicateName,
    /// Role or bundle already holds the permission.
    DuplicateGrant,
}

impl ConflictKind {
    /// Returns a stable transport value for this conflict.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateSlug => "duplicate_slug",
            Self::DuplicateKey => "duplicate_key",
            Self::DuplicateEmail => "duplicate_email",
            Self::DuplicateName => "duplicate_name",
            Self::DuplicateGrant => "duplicate_grant",
        }
    }
}

impl Display for ConflictKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// One or more request fields were rejected.
    #[error("validation failed: {}", describe_violations(.0))]
    InvalidFields(Vec<FieldViolation>),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict ({0}): {1}")]
    Conflict(ConflictKind, String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable category used by transports to classify the failure.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidFields(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Conflict(ConflictKind::DuplicateSlug, _) => "conflict.duplicate_slug",
            Self::Conflict(ConflictKind::DuplicateKey, _) => "conflict.duplicate_key",
            Self::Conflict(ConflictKind::DuplicateEmail, _) => "conflict.duplicate_email",
            Self::Conflict(ConflictKind::DuplicateName, _) => "conflict.duplicate_name",
            Self::Conflict(ConflictKind::DuplicateGrant, _) => "conflict.duplicate_grant",
            Self::Unauthorized(_) => "unauthenticated",
            Self::Forbidden(_) => "insufficient_permission",
            Self::Internal(_) => "internal_failure",
        }
    }
}

impl From<Infallible> for AppError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}
