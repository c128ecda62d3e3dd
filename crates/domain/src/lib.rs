//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod bundle;
mod identifiers;
mod permission;
mod permission_key;
mod profile;
mod role;
mod security;
mod user;

pub use bundle::{BundleWithPermissions, PermissionBundle};
pub use identifiers::{BundleId, PermissionId, RoleId};
pub use permission::{Permission, group_permissions_by_entity, sort_permissions};
pub use permission_key::{PERMISSION_KEY_SEPARATOR, PermissionKey, build_key, parse_key};
pub use profile::UserProfile;
pub use role::{Role, RoleSlug, RoleWithPermissions};
pub use rolegate_core::UserId;
pub use security::AdminPermission;
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, User, UserWithRole, validate_password,
};
