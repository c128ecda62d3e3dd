use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult, UserId};
use rolegate_domain::{UserProfile, UserWithRole, sort_permissions};

use crate::AuthorizationRepository;

/// How a disabled role contributes to its users' effective permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisabledRolePolicy {
    /// Users of a disabled role hold no permissions.
    #[default]
    Revoke,
    /// A disabled role still grants its permissions.
    Retain,
}

impl DisabledRolePolicy {
    /// Returns the configuration value for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revoke => "revoke",
            Self::Retain => "retain",
        }
    }
}

impl FromStr for DisabledRolePolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "revoke" => Ok(Self::Revoke),
            "retain" => Ok(Self::Retain),
            other => Err(AppError::Validation(format!(
                "unknown disabled role policy '{other}', expected 'revoke' or 'retain'"
            ))),
        }
    }
}

impl Display for DisabledRolePolicy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Computes a user's effective permissions from their single role.
///
/// Nothing is cached: every call reads the current projection.
#[derive(Clone)]
pub struct PermissionResolver {
    repository: Arc<dyn AuthorizationRepository>,
    disabled_role_policy: DisabledRolePolicy,
}

impl PermissionResolver {
    /// Creates a resolver over the authorization read port.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        disabled_role_policy: DisabledRolePolicy,
    ) -> Self {
        Self {
            repository,
            disabled_role_policy,
        }
    }

    /// Returns the policy applied to disabled roles.
    #[must_use]
    pub fn disabled_role_policy(&self) -> DisabledRolePolicy {
        self.disabled_role_policy
    }

    /// Resolves the profile of a user, or `None` when the user does not exist.
    pub async fn resolve(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        let Some(user_with_role) = self.repository.find_user_with_role(user_id).await? else {
            return Ok(None);
        };

        Ok(Some(self.build_profile(user_with_role)))
    }

    fn build_profile(&self, user_with_role: UserWithRole) -> UserProfile {
        let UserWithRole { user, role } = user_with_role;

        let mut permissions = match &role {
            Some(role)
                if role.role.is_disabled()
                    && self.disabled_role_policy == DisabledRolePolicy::Revoke =>
            {
                Vec::new()
            }
            Some(role) => role.permissions.clone(),
            None => Vec::new(),
        };
        sort_permissions(&mut permissions);

        UserProfile::new(
            user.id(),
            user.email().clone(),
            user.name().as_str(),
            role,
            permissions,
        )
    }
}
