use async_trait::async_trait;

use rolegate_core::{AppResult, UserId};
use rolegate_domain::{
    BundleId, BundleWithPermissions, EmailAddress, Permission, PermissionBundle, PermissionId,
    PermissionKey, Role, RoleId, RoleSlug, RoleWithPermissions, User, UserWithRole,
};

use super::inputs::{
    BundleChanges, GrantInsertMode, NewBundle, NewPermission, NewRole, NewUser, RoleChanges,
    UserChanges, UserCredentials,
};

/// Read port used by the effective permission resolver.
///
/// Adapters perform the user → role → grants → permissions join and hand back
/// the flattened projection.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds a user with its role and that role's permissions.
    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>>;
}

/// Repository port for the permission catalogue.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists permissions ordered by entity then operation.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Finds one permission by id.
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>>;

    /// Finds one permission by key.
    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>>;

    /// Registers a permission. A taken key is `Conflict(DuplicateKey)`.
    async fn create_permission(&self, input: NewPermission) -> AppResult<Permission>;

    /// Deletes a permission and every grant that references it.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Lists distinct entities, sorted.
    async fn list_entities(&self) -> AppResult<Vec<String>>;

    /// Lists distinct operations, sorted.
    async fn list_operations(&self) -> AppResult<Vec<String>>;
}

/// Repository port for roles and role grants.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles, newest first.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds a role with its granted permissions.
    async fn find_role_with_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Option<RoleWithPermissions>>;

    /// Finds a role by slug.
    async fn find_role_by_slug(&self, slug: &RoleSlug) -> AppResult<Option<Role>>;

    /// Creates a role. A taken slug is `Conflict(DuplicateSlug)`.
    async fn create_role(&self, input: NewRole) -> AppResult<Role>;

    /// Applies a partial update.
    async fn update_role(&self, role_id: RoleId, changes: RoleChanges) -> AppResult<Role>;

    /// Deletes a role and its grants; users keep no role.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Inserts grants in one atomic step and returns how many rows were added.
    ///
    /// A missing role or permission is `NotFound`, including for an empty batch
    /// against a missing role.
    async fn insert_role_grants(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        mode: GrantInsertMode,
    ) -> AppResult<usize>;

    /// Removes one grant. An absent grant is `NotFound`.
    async fn remove_role_grant(&self, role_id: RoleId, permission_id: PermissionId)
    -> AppResult<()>;
}

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists users with their roles, newest first.
    async fn list_users_with_roles(&self) -> AppResult<Vec<UserWithRole>>;

    /// Finds a user with its role.
    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>>;

    /// Creates a user. A taken email is `Conflict(DuplicateEmail)`.
    async fn create_user(&self, input: NewUser) -> AppResult<User>;

    /// Applies a partial update.
    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<User>;

    /// Deletes a user.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;

    /// Finds stored credentials by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>>;
}

/// Repository port for permission bundles and bundle grants.
#[async_trait]
pub trait BundleRepository: Send + Sync {
    /// Lists bundles with their permissions, newest first.
    async fn list_bundles(&self) -> AppResult<Vec<BundleWithPermissions>>;

    /// Finds a bundle with its permissions.
    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<BundleWithPermissions>>;

    /// Creates a bundle and its initial grants in one transaction.
    async fn create_bundle(
        &self,
        input: NewBundle,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionBundle>;

    /// Applies a partial update.
    async fn update_bundle(
        &self,
        bundle_id: BundleId,
        changes: BundleChanges,
    ) -> AppResult<PermissionBundle>;

    /// Deletes a bundle and its grants. Roles seeded from it keep their grants.
    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()>;

    /// Inserts grants all-or-nothing; an existing grant is `Conflict(DuplicateGrant)`.
    async fn insert_bundle_grants(
        &self,
        bundle_id: BundleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<usize>;

    /// Removes one grant. An absent grant is `NotFound`.
    async fn remove_bundle_grant(
        &self,
        bundle_id: BundleId,
        permission_id: PermissionId,
    ) -> AppResult<()>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
