use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{Permission, RoleId};

/// URL-safe role slug: lowercase ASCII letters, digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct RoleSlug(String);

impl RoleSlug {
    /// Creates a validated slug.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation("slug is required".to_owned()));
        }

        if !value
            .chars()
            .all(|character| matches!(character, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(AppError::Validation(
                "slug must contain only lowercase letters, numbers, and hyphens".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the slug string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleSlug {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl Display for RoleSlug {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// A named set of grants that users are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    slug: RoleSlug,
    name: NonEmptyString,
    disabled: bool,
    created_at: DateTime<Utc>,
}

impl Role {
    /// Creates a role record.
    #[must_use]
    pub fn new(
        id: RoleId,
        slug: RoleSlug,
        name: NonEmptyString,
        disabled: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            slug,
            name,
            disabled,
            created_at,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the immutable slug.
    #[must_use]
    pub fn slug(&self) -> &RoleSlug {
        &self.slug
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns whether the role is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A role together with every permission currently granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    /// The role record.
    pub role: Role,
    /// Granted permissions, ordered by entity then operation.
    pub permissions: Vec<Permission>,
}
