use std::sync::Arc;

use rolegate_core::{AppError, AppResult, UserIdentity};
use rolegate_domain::{
    AdminPermission, BundleId, BundleWithPermissions, PermissionBundle, PermissionId,
};
use tracing::info;

use crate::validation::{Violations, normalize_description, resolve_id};
use crate::{AuthorizationService, BundleChanges, BundleRepository, NewBundle};

/// Raw payload for creating a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBundleInput {
    /// Unique bundle name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial permissions; may be empty.
    pub permission_ids: Vec<String>,
}

/// Raw payload for a partial bundle update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBundleInput {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description; blank clears it.
    pub description: Option<String>,
}

/// Application service for permission bundles.
#[derive(Clone)]
pub struct BundleService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn BundleRepository>,
}

impl BundleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn BundleRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Lists bundles with their permissions.
    pub async fn list_bundles(&self, actor: &UserIdentity) -> AppResult<Vec<BundleWithPermissions>> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsRead)
            .await?;

        self.repository.list_bundles().await
    }

    /// Returns one bundle with its permissions.
    pub async fn get_bundle(
        &self,
        actor: &UserIdentity,
        bundle_id: impl TryInto<BundleId, Error: Into<AppError>>,
    ) -> AppResult<BundleWithPermissions> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsRead)
            .await?;
        let bundle_id: BundleId = resolve_id(bundle_id)?;

        self.repository
            .find_bundle(bundle_id)
            .await?
            .ok_or_else(|| bundle_not_found(bundle_id))
    }

    /// Creates a bundle together with its initial permissions.
    pub async fn create_bundle(
        &self,
        actor: &UserIdentity,
        input: CreateBundleInput,
    ) -> AppResult<PermissionBundle> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsCreate)
            .await?;

        let mut violations = Violations::new();
        let name = violations.require_text("name", input.name);
        let permission_ids =
            violations.optional_permission_ids("permission_ids", &input.permission_ids);

        let Some(name) = name else {
            return Err(violations.into_error());
        };
        violations.finish()?;

        let bundle = self
            .repository
            .create_bundle(
                NewBundle {
                    name,
                    description: normalize_description(input.description),
                },
                &permission_ids,
            )
            .await?;

        info!(
            actor = %actor.user_id(),
            bundle_id = %bundle.id(),
            permissions = permission_ids.len(),
            "bundle created"
        );

        Ok(bundle)
    }

    /// Updates a bundle's name or description.
    pub async fn update_bundle(
        &self,
        actor: &UserIdentity,
        bundle_id: impl TryInto<BundleId, Error: Into<AppError>>,
        input: UpdateBundleInput,
    ) -> AppResult<PermissionBundle> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsUpdate)
            .await?;
        let bundle_id: BundleId = resolve_id(bundle_id)?;

        let mut violations = Violations::new();
        let name = violations.optional_text("name", input.name);
        violations.finish()?;

        let bundle = self
            .repository
            .update_bundle(
                bundle_id,
                BundleChanges {
                    name,
                    description: input
                        .description
                        .map(|description| normalize_description(Some(description))),
                },
            )
            .await?;

        info!(actor = %actor.user_id(), bundle_id = %bundle_id, "bundle updated");
        Ok(bundle)
    }

    /// Deletes a bundle. Roles that absorbed it keep their grants.
    pub async fn delete_bundle(
        &self,
        actor: &UserIdentity,
        bundle_id: impl TryInto<BundleId, Error: Into<AppError>>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsDelete)
            .await?;
        let bundle_id: BundleId = resolve_id(bundle_id)?;

        self.repository.delete_bundle(bundle_id).await?;

        info!(actor = %actor.user_id(), bundle_id = %bundle_id, "bundle deleted");
        Ok(())
    }

    /// Adds permissions to a bundle. One existing grant aborts the batch.
    pub async fn assign_permissions(
        &self,
        actor: &UserIdentity,
        bundle_id: impl TryInto<BundleId, Error: Into<AppError>>,
        permission_ids: &[String],
    ) -> AppResult<usize> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsUpdate)
            .await?;
        let bundle_id: BundleId = resolve_id(bundle_id)?;

        let mut violations = Violations::new();
        let permission_ids = violations.permission_ids("permission_ids", permission_ids);
        violations.finish()?;

        let inserted = self
            .repository
            .insert_bundle_grants(bundle_id, &permission_ids)
            .await?;

        info!(
            actor = %actor.user_id(),
            bundle_id = %bundle_id,
            inserted,
            "bundle permissions assigned"
        );

        Ok(inserted)
    }

    /// Removes one permission from a bundle.
    pub async fn remove_permission(
        &self,
        actor: &UserIdentity,
        bundle_id: impl TryInto<BundleId, Error: Into<AppError>>,
        permission_id: impl TryInto<PermissionId, Error: Into<AppError>>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AdminPermission::PermissionsUpdate)
            .await?;
        let bundle_id: BundleId = resolve_id(bundle_id)?;
        let permission_id: PermissionId = resolve_id(permission_id)?;

        self.repository
            .remove_bundle_grant(bundle_id, permission_id)
            .await?;

        info!(
            actor = %actor.user_id(),
            bundle_id = %bundle_id,
            permission_id = %permission_id,
            "bundle permission removed"
        );

        Ok(())
    }
}

fn bundle_not_found(bundle_id: BundleId) -> AppError {
    AppError::NotFound(format!("bundle '{bundle_id}' not found"))
}
