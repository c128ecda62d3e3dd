use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use rolegate_application::{GrantInsertMode, NewRole, RoleChanges, RoleRepository};
use rolegate_core::{AppError, AppResult, ConflictKind};
use rolegate_domain::{PermissionId, Role, RoleId, RoleSlug, RoleWithPermissions, User};

use super::{InMemoryAccessRepository, Sequenced};

#[async_trait]
impl RoleRepository for InMemoryAccessRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<&Sequenced<Role>> = state.roles.values().collect();
        roles.sort_by(|left, right| right.sequence.cmp(&left.sequence));
        Ok(roles.into_iter().map(|role| role.value.clone()).collect())
    }

    async fn find_role_with_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Option<RoleWithPermissions>> {
        Ok(self.state.read().await.role_with_permissions(role_id))
    }

    async fn find_role_by_slug(&self, slug: &RoleSlug) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .find(|role| role.value.slug() == slug)
            .map(|role| role.value.clone()))
    }

    async fn create_role(&self, input: NewRole) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|role| role.value.slug() == &input.slug)
        {
            return Err(AppError::Conflict(
                ConflictKind::DuplicateSlug,
                format!("role slug '{}' is already taken", input.slug),
            ));
        }

        let role = Role::new(
            RoleId::new(),
            input.slug,
            input.name,
            input.disabled,
            Utc::now(),
        );
        let sequence = state.next_sequence();
        state.roles.insert(
            role.id(),
            Sequenced {
                sequence,
                value: role.clone(),
            },
        );
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, changes: RoleChanges) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let Some(stored) = state.roles.get_mut(&role_id) else {
            return Err(role_not_found(role_id));
        };

        let current = &stored.value;
        let role = Role::new(
            current.id(),
            current.slug().clone(),
            changes.name.unwrap_or_else(|| current.name().clone()),
            changes.disabled.unwrap_or(current.is_disabled()),
            current.created_at(),
        );
        stored.value = role.clone();
        Ok(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.remove(&role_id).is_none() {
            return Err(role_not_found(role_id));
        }

        state.role_grants.retain(|(granted, _)| *granted != role_id);
        for stored in state.users.values_mut() {
            if stored.user.role_id() == Some(role_id) {
                let user = &stored.user;
                stored.user = User::new(
                    user.id(),
                    user.email().clone(),
                    user.name().clone(),
                    None,
                    user.created_at(),
                );
            }
        }

        Ok(())
    }

    async fn insert_role_grants(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        mode: GrantInsertMode,
    ) -> AppResult<usize> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(role_not_found(role_id));
        }

        if !state.all_permissions_exist(permission_ids) {
            return Err(AppError::NotFound(
                "one or more permissions do not exist".to_owned(),
            ));
        }

        let grants: Vec<(RoleId, PermissionId)> = permission_ids
            .iter()
            .map(|permission_id| (role_id, *permission_id))
            .collect();

        if mode == GrantInsertMode::RejectDuplicates {
            let mut seen = BTreeSet::new();
            let duplicate = grants
                .iter()
                .any(|grant| state.role_grants.contains(grant) || !seen.insert(*grant));
            if duplicate {
                return Err(AppError::Conflict(
                    ConflictKind::DuplicateGrant,
                    format!("role '{role_id}' already holds one of the permissions"),
                ));
            }
        }

        Ok(grants
            .into_iter()
            .filter(|grant| state.role_grants.insert(*grant))
            .count())
    }

    async fn remove_role_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        if self
            .state
            .write()
            .await
            .role_grants
            .remove(&(role_id, permission_id))
        {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "permission '{permission_id}' is not granted to role '{role_id}'"
        )))
    }
}

fn role_not_found(role_id: RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' not found"))
}
