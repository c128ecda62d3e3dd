use rolegate_core::NonEmptyString;
use rolegate_domain::{EmailAddress, PermissionKey, RoleId, RoleSlug, User};

/// Validated payload for registering a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermission {
    /// Canonical key built from entity and operation.
    pub key: PermissionKey,
    /// Optional description.
    pub description: Option<String>,
}

/// Validated payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Unique slug.
    pub slug: RoleSlug,
    /// Display name.
    pub name: NonEmptyString,
    /// Initial disabled flag.
    pub disabled: bool,
}

/// Partial role update. The slug never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    /// Replacement display name.
    pub name: Option<NonEmptyString>,
    /// Replacement disabled flag.
    pub disabled: Option<bool>,
}

/// Validated payload for creating a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login email.
    pub email: EmailAddress,
    /// Display name.
    pub name: NonEmptyString,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Initial role, if any.
    pub role_id: Option<RoleId>,
}

/// Partial user update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// Replacement display name.
    pub name: Option<NonEmptyString>,
    /// Replacement role.
    pub role_id: Option<RoleId>,
}

/// Validated payload for creating a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBundle {
    /// Unique bundle name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial bundle update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleChanges {
    /// Replacement name.
    pub name: Option<NonEmptyString>,
    /// Replacement description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

/// How a batch of grants treats rows that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantInsertMode {
    /// Any existing grant aborts the whole batch with a conflict.
    RejectDuplicates,
    /// Existing grants are skipped; only new rows are inserted.
    SkipExisting,
}

/// Stored credentials for password authentication.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// The account the credentials belong to.
    pub user: User,
    /// Argon2id PHC string.
    pub password_hash: String,
}
