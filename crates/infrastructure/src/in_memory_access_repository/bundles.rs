use std::collections::BTreeSet;

use async_trait::async_trait;
use rolegate_application::{BundleChanges, BundleRepository, NewBundle};
use rolegate_core::{AppError, AppResult, ConflictKind};
use rolegate_domain::{BundleId, BundleWithPermissions, PermissionBundle, PermissionId};

use super::{AccessState, InMemoryAccessRepository, Sequenced};

#[async_trait]
impl BundleRepository for InMemoryAccessRepository {
    async fn list_bundles(&self) -> AppResult<Vec<BundleWithPermissions>> {
        let state = self.state.read().await;
        let mut bundles: Vec<&Sequenced<PermissionBundle>> = state.bundles.values().collect();
        bundles.sort_by(|left, right| right.sequence.cmp(&left.sequence));
        Ok(bundles
            .into_iter()
            .map(|bundle| state.bundle_with_permissions(&bundle.value))
            .collect())
    }

    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<BundleWithPermissions>> {
        let state = self.state.read().await;
        Ok(state
            .bundles
            .get(&bundle_id)
            .map(|bundle| state.bundle_with_permissions(&bundle.value)))
    }

    async fn create_bundle(
        &self,
        input: NewBundle,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionBundle> {
        let mut state = self.state.write().await;
        ensure_name_available(&state, input.name.as_str(), None)?;

        let bundle = PermissionBundle::new(BundleId::new(), input.name, input.description);
        check_new_grants(&state, bundle.id(), permission_ids)?;

        let sequence = state.next_sequence();
        state.bundles.insert(
            bundle.id(),
            Sequenced {
                sequence,
                value: bundle.clone(),
            },
        );
        for permission_id in permission_ids {
            state.bundle_grants.insert((bundle.id(), *permission_id));
        }

        Ok(bundle)
    }

    async fn update_bundle(
        &self,
        bundle_id: BundleId,
        changes: BundleChanges,
    ) -> AppResult<PermissionBundle> {
        let mut state = self.state.write().await;
        if let Some(name) = changes.name.as_ref() {
            ensure_name_available(&state, name.as_str(), Some(bundle_id))?;
        }

        let Some(stored) = state.bundles.get_mut(&bundle_id) else {
            return Err(bundle_not_found(bundle_id));
        };

        let current = &stored.value;
        let bundle = PermissionBundle::new(
            bundle_id,
            changes.name.unwrap_or_else(|| current.name().clone()),
            changes
                .description
                .unwrap_or_else(|| current.description().map(str::to_owned)),
        );
        stored.value = bundle.clone();
        Ok(bundle)
    }

    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.bundles.remove(&bundle_id).is_none() {
            return Err(bundle_not_found(bundle_id));
        }

        state
            .bundle_grants
            .retain(|(granted, _)| *granted != bundle_id);
        Ok(())
    }

    async fn insert_bundle_grants(
        &self,
        bundle_id: BundleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<usize> {
        let mut state = self.state.write().await;
        if !state.bundles.contains_key(&bundle_id) {
            return Err(bundle_not_found(bundle_id));
        }

        check_new_grants(&state, bundle_id, permission_ids)?;
        for permission_id in permission_ids {
            state.bundle_grants.insert((bundle_id, *permission_id));
        }

        Ok(permission_ids.len())
    }

    async fn remove_bundle_grant(
        &self,
        bundle_id: BundleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        if self
            .state
            .write()
            .await
            .bundle_grants
            .remove(&(bundle_id, permission_id))
        {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "permission '{permission_id}' is not part of bundle '{bundle_id}'"
        )))
    }
}

fn ensure_name_available(
    state: &AccessState,
    name: &str,
    except: Option<BundleId>,
) -> AppResult<()> {
    let taken = state.bundles.values().any(|bundle| {
        bundle.value.name().as_str() == name && Some(bundle.value.id()) != except
    });

    if taken {
        return Err(AppError::Conflict(
            ConflictKind::DuplicateName,
            format!("bundle '{name}' already exists"),
        ));
    }

    Ok(())
}

fn check_new_grants(
    state: &AccessState,
    bundle_id: BundleId,
    permission_ids: &[PermissionId],
) -> AppResult<()> {
    if !state.all_permissions_exist(permission_ids) {
        return Err(AppError::NotFound(
            "one or more permissions do not exist".to_owned(),
        ));
    }

    let mut seen = BTreeSet::new();
    let duplicate = permission_ids.iter().any(|permission_id| {
        state.bundle_grants.contains(&(bundle_id, *permission_id)) || !seen.insert(*permission_id)
    });
    if duplicate {
        return Err(AppError::Conflict(
            ConflictKind::DuplicateGrant,
            format!("bundle '{bundle_id}' already holds one of the permissions"),
        ));
    }

    Ok(())
}

fn bundle_not_found(bundle_id: BundleId) -> AppError {
    AppError::NotFound(format!("bundle '{bundle_id}' not found"))
}
