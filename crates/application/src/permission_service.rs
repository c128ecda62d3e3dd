use std::sync::Arc;

use rolegate_core::{AppError, AppResult, UserIdentity};
use rolegate_domain::{
    AdminPermission, PERMISSION_KEY_SEPARATOR, Permission, PermissionId, build_key,
};
use tracing::info;

use crate::validation::{Violations, normalize_description, resolve_id};
use crate::{AuthorizationService, NewPermission, PermissionRepository};

/// Raw payload for registering a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Entity half of the key.
    pub entity: String,
    /// Operation half of the key.
    pub operation: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Application service for the permission catalogue.
#[derive(Clone)]
pub struct PermissionService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Lists every permission.
    pub async fn list_permissions(&self, actor: &UserIdentity) -> AppResult<Vec<Permission>> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsRead)
            .await?;

        self.repository.list_permissions().await
    }

    /// Returns one permission.
    pub async fn get_permission(
        &self,
        actor: &UserIdentity,
        permission_id: impl TryInto<PermissionId, Error: Into<AppError>>,
    ) -> AppResult<Permission> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsRead)
            .await?;
        let permission_id: PermissionId = resolve_id(permission_id)?;

        self.repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{permission_id}' not found")))
    }

    /// Registers a permission under its `entity.operation` key.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsCreate)
            .await?;

        let new_permission = validate_create_permission(input)?;
        let permission = self.repository.create_permission(new_permission).await?;

        info!(
            actor = %actor.user_id(),
            permission_id = %permission.id(),
            key = %permission.key(),
            "permission created"
        );

        Ok(permission)
    }

    /// Deletes a permission; its grants go with it.
    pub async fn delete_permission(
        &self,
        actor: &UserIdentity,
        permission_id: impl TryInto<PermissionId, Error: Into<AppError>>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsDelete)
            .await?;
        let permission_id: PermissionId = resolve_id(permission_id)?;

        self.repository.delete_permission(permission_id).await?;

        info!(
            actor = %actor.user_id(),
            permission_id = %permission_id,
            "permission deleted"
        );

        Ok(())
    }

    /// Lists the distinct entities in the catalogue.
    pub async fn list_entities(&self, actor: &UserIdentity) -> AppResult<Vec<String>> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsRead)
            .await?;

        self.repository.list_entities().await
    }

    /// Lists the distinct operations in the catalogue.
    pub async fn list_operations(&self, actor: &UserIdentity) -> AppResult<Vec<String>> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsRead)
            .await?;

        self.repository.list_operations().await
    }
}

fn validate_create_permission(input: CreatePermissionInput) -> AppResult<NewPermission> {
    let mut violations = Violations::new();
    let entity = violations.require_text("entity", input.entity);
    let operation = violations.require_text("operation", input.operation);

    if let Some(entity) = &entity
        && entity.as_str().contains(PERMISSION_KEY_SEPARATOR)
    {
        violations.push(
            "entity",
            format!("entity must not contain '{PERMISSION_KEY_SEPARATOR}'"),
        );
    }

    match (entity, operation) {
        (Some(entity), Some(operation)) if violations.is_empty() => Ok(NewPermission {
            key: build_key(entity.as_str().trim(), operation.as_str().trim())?,
            description: normalize_description(input.description),
        }),
        _ => Err(violations.into_error()),
    }
}
