//! Canonical `entity.operation` permission keys.
//!
//! [`PermissionKey`] is the only way a key travels through the workspace. It is
//! produced by [`build_key`] or by parsing a stored value, so every holder can
//! rely on both halves being present.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Literal separator between entity and operation.
pub const PERMISSION_KEY_SEPARATOR: char = '.';

/// Validated permission key in `entity.operation` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey {
    value: String,
    split_at: usize,
}

impl PermissionKey {
    /// Parses a stored or transported key, splitting on the first separator.
    pub fn parse(value: &str) -> AppResult<Self> {
        let Some(split_at) = value.find(PERMISSION_KEY_SEPARATOR) else {
            return Err(invalid_key(value, "missing '.' separator"));
        };

        let (entity, operation) = (&value[..split_at], &value[split_at + 1..]);
        if entity.trim().is_empty() || operation.trim().is_empty() {
            return Err(invalid_key(value, "entity and operation must not be empty"));
        }

        Ok(Self {
            value: value.to_owned(),
            split_at,
        })
    }

    /// Returns the entity half.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.value[..self.split_at]
    }

    /// Returns the operation half.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.value[self.split_at + 1..]
    }

    /// Returns the full key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }
}

/// Builds the canonical key for an entity and operation.
///
/// The entity may not contain the separator, otherwise the key could not be
/// split back into the same parts.
pub fn build_key(entity: &str, operation: &str) -> AppResult<PermissionKey> {
    if entity.trim().is_empty() {
        return Err(AppError::Validation(
            "permission entity must not be empty".to_owned(),
        ));
    }

    if operation.trim().is_empty() {
        return Err(AppError::Validation(
            "permission operation must not be empty".to_owned(),
        ));
    }

    if entity.contains(PERMISSION_KEY_SEPARATOR) {
        return Err(AppError::Validation(format!(
            "permission entity '{entity}' must not contain '{PERMISSION_KEY_SEPARATOR}'"
        )));
    }

    Ok(PermissionKey {
        value: format!("{entity}{PERMISSION_KEY_SEPARATOR}{operation}"),
        split_at: entity.len(),
    })
}

/// Splits a key into its entity and operation.
pub fn parse_key(key: &str) -> AppResult<(String, String)> {
    let key = PermissionKey::parse(key)?;
    Ok((key.entity().to_owned(), key.operation().to_owned()))
}

fn invalid_key(value: &str, reason: &str) -> AppError {
    AppError::Validation(format!("invalid permission key '{value}': {reason}"))
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.value
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.value.as_str())
    }
}
