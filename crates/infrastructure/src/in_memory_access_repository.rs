//! In-memory adapter for every access-control port.
//!
//! Mirrors the relational schema: unique slugs, keys, emails and bundle names,
//! composite grant keys, cascading deletes, and `ON DELETE SET NULL` for a
//! user's role.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use rolegate_application::AuthorizationRepository;
use rolegate_core::{AppResult, UserId};
use rolegate_domain::{
    BundleId, BundleWithPermissions, Permission, PermissionBundle, PermissionId, Role, RoleId,
    RoleWithPermissions, User, UserWithRole, sort_permissions,
};
use tokio::sync::RwLock;

mod bundles;
mod permissions;
mod roles;
mod users;

#[cfg(test)]
mod tests;

/// In-memory repository backing the memory storage backend and tests.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    state: RwLock<AccessState>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AccessState::default()),
        }
    }
}

#[derive(Debug, Default)]
struct AccessState {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Sequenced<Role>>,
    users: HashMap<UserId, StoredUser>,
    bundles: HashMap<BundleId, Sequenced<PermissionBundle>>,
    role_grants: BTreeSet<(RoleId, PermissionId)>,
    bundle_grants: BTreeSet<(BundleId, PermissionId)>,
    sequence: u64,
}

/// Insertion counter used for newest-first listings.
#[derive(Debug, Clone)]
struct Sequenced<T> {
    sequence: u64,
    value: T,
}

#[derive(Debug, Clone)]
struct StoredUser {
    sequence: u64,
    user: User,
    password_hash: String,
}

impl AccessState {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn permissions_by_id(&self, permission_ids: impl Iterator<Item = PermissionId>) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = permission_ids
            .filter_map(|permission_id| self.permissions.get(&permission_id).cloned())
            .collect();
        sort_permissions(&mut permissions);
        permissions
    }

    fn all_permissions_exist(&self, permission_ids: &[PermissionId]) -> bool {
        permission_ids
            .iter()
            .all(|permission_id| self.permissions.contains_key(permission_id))
    }

    fn role_with_permissions(&self, role_id: RoleId) -> Option<RoleWithPermissions> {
        let role = self.roles.get(&role_id)?;
        let granted = self
            .role_grants
            .iter()
            .filter(|(granted_role, _)| *granted_role == role_id)
            .map(|(_, permission_id)| *permission_id);

        Some(RoleWithPermissions {
            role: role.value.clone(),
            permissions: self.permissions_by_id(granted),
        })
    }

    fn user_with_role(&self, stored: &StoredUser) -> UserWithRole {
        UserWithRole {
            user: stored.user.clone(),
            role: stored
                .user
                .role_id()
                .and_then(|role_id| self.role_with_permissions(role_id)),
        }
    }

    fn bundle_with_permissions(&self, bundle: &PermissionBundle) -> BundleWithPermissions {
        let granted = self
            .bundle_grants
            .iter()
            .filter(|(granted_bundle, _)| *granted_bundle == bundle.id())
            .map(|(_, permission_id)| *permission_id);

        BundleWithPermissions {
            bundle: bundle.clone(),
            permissions: self.permissions_by_id(granted),
        }
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAccessRepository {
    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|stored| state.user_with_role(stored)))
    }
}
