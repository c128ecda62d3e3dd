use std::str::FromStr;

use rolegate_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{PermissionKey, build_key};

/// Permissions that gate the administration surface itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    /// Allows listing permissions and bundles.
    PermissionsRead,
    /// Allows creating permissions and bundles.
    PermissionsCreate,
    /// Allows editing bundles and their grants.
    PermissionsUpdate,
    /// Allows deleting permissions and bundles.
    PermissionsDelete,
    /// Allows listing and reading roles.
    RolesRead,
    /// Allows creating roles.
    RolesCreate,
    /// Allows editing roles and their grants.
    RolesUpdate,
    /// Allows deleting roles.
    RolesDelete,
    /// Allows listing and reading users.
    UsersRead,
    /// Allows creating users.
    UsersCreate,
    /// Allows editing users and their role.
    UsersUpdate,
    /// Allows deleting users.
    UsersDelete,
}

impl AdminPermission {
    /// Returns the entity half of the key.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        match self {
            Self::PermissionsRead
            | Self::PermissionsCreate
            | Self::PermissionsUpdate
            | Self::PermissionsDelete => "permissions",
            Self::RolesRead | Self::RolesCreate | Self::RolesUpdate | Self::RolesDelete => "roles",
            Self::UsersRead | Self::UsersCreate | Self::UsersUpdate | Self::UsersDelete => "users",
        }
    }

    /// Returns the operation half of the key.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::PermissionsRead | Self::RolesRead | Self::UsersRead => "read",
            Self::PermissionsCreate | Self::RolesCreate | Self::UsersCreate => "create",
            Self::PermissionsUpdate | Self::RolesUpdate | Self::UsersUpdate => "update",
            Self::PermissionsDelete | Self::RolesDelete | Self::UsersDelete => "delete",
        }
    }

    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionsRead => "permissions.read",
            Self::PermissionsCreate => "permissions.create",
            Self::PermissionsUpdate => "permissions.update",
            Self::PermissionsDelete => "permissions.delete",
            Self::RolesRead => "roles.read",
            Self::RolesCreate => "roles.create",
            Self::RolesUpdate => "roles.update",
            Self::RolesDelete => "roles.delete",
            Self::UsersRead => "users.read",
            Self::UsersCreate => "users.create",
            Self::UsersUpdate => "users.update",
            Self::UsersDelete => "users.delete",
        }
    }

    /// Returns the validated key for this permission.
    pub fn key(&self) -> Result<PermissionKey, AppError> {
        build_key(self.entity(), self.operation())
    }

    /// Returns all known administrative permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminPermission] = &[
            AdminPermission::PermissionsRead,
            AdminPermission::PermissionsCreate,
            AdminPermission::PermissionsUpdate,
            AdminPermission::PermissionsDelete,
            AdminPermission::RolesRead,
            AdminPermission::RolesCreate,
            AdminPermission::RolesUpdate,
            AdminPermission::RolesDelete,
            AdminPermission::UsersRead,
            AdminPermission::UsersCreate,
            AdminPermission::UsersUpdate,
            AdminPermission::UsersDelete,
        ];

        ALL
    }
}

impl FromStr for AdminPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!("unknown administrative permission '{value}'"))
            })
    }
}
