use std::sync::Arc;

use rolegate_core::{AppError, AppResult, UserIdentity};
use rolegate_domain::{
    AdminPermission, BundleId, PermissionId, Role, RoleId, RoleSlug, RoleWithPermissions,
};
use tracing::info;

use crate::validation::{Violations, resolve_id};
use crate::{
    AuthorizationService, BundleRepository, GrantInsertMode, NewRole, RoleChanges, RoleRepository,
};

/// Raw payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique slug, lowercase letters, digits and hyphens.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Initial disabled flag.
    pub disabled: bool,
}

/// Raw payload for a partial role update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement disabled flag.
    pub disabled: Option<bool>,
}

/// Application service for roles and their grants.
#[derive(Clone)]
pub struct RoleService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleRepository>,
    bundle_repository: Arc<dyn BundleRepository>,
}

impl RoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleRepository>,
        bundle_repository: Arc<dyn BundleRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            bundle_repository,
        }
    }

    /// Lists roles.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesRead)
            .await?;

        self.repository.list_roles().await
    }

    /// Returns a role with its current grants.
    pub async fn get_role(
        &self,
        actor: &UserIdentity,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
    ) -> AppResult<RoleWithPermissions> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesRead)
            .await?;
        let role_id: RoleId = resolve_id(role_id)?;

        self.repository
            .find_role_with_permissions(role_id)
            .await?
            .ok_or_else(|| role_not_found(role_id))
    }

    /// Creates a role.
    pub async fn create_role(&self, actor: &UserIdentity, input: CreateRoleInput) -> AppResult<Role> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesCreate)
            .await?;

        let new_role = validate_create_role(input)?;
        let role = self.repository.create_role(new_role).await?;

        info!(
            actor = %actor.user_id(),
            role_id = %role.id(),
            slug = %role.slug(),
            "role created"
        );

        Ok(role)
    }

    /// Updates a role's name or disabled flag.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesUpdate)
            .await?;
        let role_id: RoleId = resolve_id(role_id)?;

        let mut violations = Violations::new();
        let name = violations.optional_text("name", input.name);
        violations.finish()?;

        let role = self
            .repository
            .update_role(
                role_id,
                RoleChanges {
                    name,
                    disabled: input.disabled,
                },
            )
            .await?;

        info!(
            actor = %actor.user_id(),
            role_id = %role_id,
            disabled = role.is_disabled(),
            "role updated"
        );

        Ok(role)
    }

    /// Deletes a role and its grants.
    pub async fn delete_role(
        &self,
        actor: &UserIdentity,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesDelete)
            .await?;
        let role_id: RoleId = resolve_id(role_id)?;

        self.repository.delete_role(role_id).await?;

        info!(actor = %actor.user_id(), role_id = %role_id, "role deleted");
        Ok(())
    }

    /// Grants permissions to a role. One existing grant aborts the batch.
    pub async fn assign_permissions(
        &self,
        actor: &UserIdentity,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
        permission_ids: &[String],
    ) -> AppResult<usize> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesUpdate)
            .await?;
        let role_id: RoleId = resolve_id(role_id)?;

        let mut violations = Violations::new();
        let permission_ids = violations.permission_ids("permission_ids", permission_ids);
        violations.finish()?;

        let inserted = self
            .repository
            .insert_role_grants(role_id, &permission_ids, GrantInsertMode::RejectDuplicates)
            .await?;

        info!(
            actor = %actor.user_id(),
            role_id = %role_id,
            inserted,
            "role permissions assigned"
        );

        Ok(inserted)
    }

    /// Revokes one permission from a role.
    pub async fn remove_permission(
        &self,
        actor: &UserIdentity,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
        permission_id: impl TryInto<PermissionId, Error: Into<AppError>>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesUpdate)
            .await?;
        let role_id: RoleId = resolve_id(role_id)?;
        let permission_id: PermissionId = resolve_id(permission_id)?;

        self.repository
            .remove_role_grant(role_id, permission_id)
            .await?;

        info!(
            actor = %actor.user_id(),
            role_id = %role_id,
            permission_id = %permission_id,
            "role permission removed"
        );

        Ok(())
    }

    /// Copies a bundle's current permissions into a role.
    ///
    /// Grants the role already holds are skipped; the returned count covers
    /// only new grants. Later bundle edits do not reach the role.
    pub async fn assign_bundle(
        &self,
        actor: &UserIdentity,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
        bundle_id: &str,
    ) -> AppResult<usize> {
        self.authorization_service
            .require_permission(actor, AdminPermission::RolesUpdate)
            .await?;
        let role_id: RoleId = resolve_id(role_id)?;

        let mut violations = Violations::new();
        let bundle_id = violations.check("bundle_id", BundleId::parse(bundle_id));
        let Some(bundle_id) = bundle_id else {
            return Err(violations.into_error());
        };

        let bundle = self
            .bundle_repository
            .find_bundle(bundle_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("bundle '{bundle_id}' not found")))?;

        let permission_ids: Vec<PermissionId> = bundle
            .permissions
            .iter()
            .map(|permission| permission.id())
            .collect();

        let inserted = self
            .repository
            .insert_role_grants(role_id, &permission_ids, GrantInsertMode::SkipExisting)
            .await?;

        info!(
            actor = %actor.user_id(),
            role_id = %role_id,
            bundle_id = %bundle_id,
            inserted,
            "bundle assigned to role"
        );

        Ok(inserted)
    }
}

fn validate_create_role(input: CreateRoleInput) -> AppResult<NewRole> {
    let mut violations = Violations::new();
    let slug = violations.check("slug", RoleSlug::new(input.slug));
    let name = violations.require_text("name", input.name);

    match (slug, name) {
        (Some(slug), Some(name)) if violations.is_empty() => Ok(NewRole {
            slug,
            name,
            disabled: input.disabled,
        }),
        _ => Err(violations.into_error()),
    }
}

fn role_not_found(role_id: RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' not found"))
}
