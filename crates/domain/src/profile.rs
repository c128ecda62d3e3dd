use rolegate_core::UserId;
use serde::{Deserialize, Serialize};

use crate::{EmailAddress, Permission, PermissionKey, RoleWithPermissions};

/// Derived view of a user and the permissions they currently hold.
///
/// Built fresh for every authorization check and every identity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    email: EmailAddress,
    name: String,
    role: Option<RoleWithPermissions>,
    permissions: Vec<Permission>,
}

impl UserProfile {
    /// Creates a profile from resolved parts.
    #[must_use]
    pub fn new(
        id: UserId,
        email: EmailAddress,
        name: impl Into<String>,
        role: Option<RoleWithPermissions>,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            id,
            email,
            name: name.into(),
            role,
            permissions,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the assigned role with its grants, if any.
    #[must_use]
    pub fn role(&self) -> Option<&RoleWithPermissions> {
        self.role.as_ref()
    }

    /// Returns the effective permissions.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_slice()
    }

    /// Returns whether the profile holds the exact key.
    #[must_use]
    pub fn holds(&self, key: &PermissionKey) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.key() == key)
    }

    /// Returns the effective permission keys in profile order.
    #[must_use]
    pub fn permission_keys(&self) -> Vec<&PermissionKey> {
        self.permissions.iter().map(Permission::key).collect()
    }
}
