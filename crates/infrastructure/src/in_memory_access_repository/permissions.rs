use std::collections::BTreeSet;

use async_trait::async_trait;
use rolegate_application::{NewPermission, PermissionRepository};
use rolegate_core::{AppError, AppResult, ConflictKind};
use rolegate_domain::{Permission, PermissionId, PermissionKey, sort_permissions};

use super::InMemoryAccessRepository;

#[async_trait]
impl PermissionRepository for InMemoryAccessRepository {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        sort_permissions(&mut permissions);
        Ok(permissions)
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(&permission_id)
            .cloned())
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.key() == key)
            .cloned())
    }

    async fn create_permission(&self, input: NewPermission) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        if state
            .permissions
            .values()
            .any(|permission| permission.key() == &input.key)
        {
            return Err(AppError::Conflict(
                ConflictKind::DuplicateKey,
                format!("permission '{}' already exists", input.key),
            ));
        }

        let permission = Permission::new(PermissionId::new(), input.key, input.description);
        state.permissions.insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.permissions.remove(&permission_id).is_none() {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' not found"
            )));
        }

        state
            .role_grants
            .retain(|(_, granted)| *granted != permission_id);
        state
            .bundle_grants
            .retain(|(_, granted)| *granted != permission_id);
        Ok(())
    }

    async fn list_entities(&self) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let entities: BTreeSet<&str> = state
            .permissions
            .values()
            .map(Permission::entity)
            .collect();
        Ok(entities.into_iter().map(str::to_owned).collect())
    }

    async fn list_operations(&self) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let operations: BTreeSet<&str> = state
            .permissions
            .values()
            .map(Permission::operation)
            .collect();
        Ok(operations.into_iter().map(str::to_owned).collect())
    }
}
