use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use rolegate_application::{BundleChanges, BundleRepository, NewBundle};
use rolegate_core::{AppError, AppResult, ConflictKind};
use rolegate_domain::{BundleId, BundleWithPermissions, PermissionBundle, PermissionId};

use crate::postgres_rows::{BundleRow, joined_permission, read_error, write_error};

/// PostgreSQL-backed repository for permission bundles.
#[derive(Clone)]
pub struct PostgresBundleRepository {
    pool: PgPool,
}

impl PostgresBundleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_bundles(&self, bundle_id: Option<BundleId>) -> AppResult<Vec<BundleWithPermissions>> {
        let rows = sqlx::query_as::<_, BundleGrantRow>(
            r#"
            SELECT
                bundles.id,
                bundles.name,
                bundles.description,
                permissions.id AS permission_id,
                permissions.key AS permission_key,
                permissions.description AS permission_description
            FROM permission_bundles AS bundles
            LEFT JOIN bundle_permissions AS grants
                ON grants.bundle_id = bundles.id
            LEFT JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE $1::uuid IS NULL OR bundles.id = $1
            ORDER BY bundles.created_at DESC, bundles.id, permissions.entity, permissions.operation
            "#,
        )
        .bind(bundle_id.map(|bundle_id| bundle_id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| read_error(error, "load bundles"))?;

        let mut bundles: Vec<BundleWithPermissions> = Vec::new();
        for row in rows {
            let permission = joined_permission(
                row.permission_id,
                row.permission_key,
                row.permission_description,
            )?;

            let is_same_bundle = bundles
                .last()
                .is_some_and(|current| current.bundle.id().as_uuid() == row.bundle.id);
            if !is_same_bundle {
                bundles.push(BundleWithPermissions {
                    bundle: PermissionBundle::try_from(row.bundle)?,
                    permissions: Vec::new(),
                });
            }

            if let (Some(current), Some(permission)) = (bundles.last_mut(), permission) {
                current.permissions.push(permission);
            }
        }

        Ok(bundles)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BundleGrantRow {
    #[sqlx(flatten)]
    bundle: BundleRow,
    permission_id: Option<Uuid>,
    permission_key: Option<String>,
    permission_description: Option<String>,
}


#[async_trait]
impl BundleRepository for PostgresBundleRepository {
    async fn list_bundles(&self) -> AppResult<Vec<BundleWithPermissions>> {
        self.fetch_bundles(None).await
    }

    async fn find_bundle(&self, bundle_id: BundleId) -> AppResult<Option<BundleWithPermissions>> {
        Ok(self.fetch_bundles(Some(bundle_id)).await?.into_iter().next())
    }

    async fn create_bundle(
        &self,
        input: NewBundle,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionBundle> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let row = sqlx::query_as::<_, BundleRow>(
            r#"
            INSERT INTO permission_bundles (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(BundleId::new().as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            write_error(
                error,
                "create bundle",
                Some((
                    ConflictKind::DuplicateName,
                    format!("bundle '{}' already exists", input.name),
                )),
                None,
            )
        })?;

        let bundle = PermissionBundle::try_from(row)?;
        insert_grants(&mut transaction, bundle.id(), permission_ids).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(bundle)
    }

    async fn update_bundle(
        &self,
        bundle_id: BundleId,
        changes: BundleChanges,
    ) -> AppResult<PermissionBundle> {
        let (replace_description, description) = match changes.description {
            Some(description) => (true, description),
            None => (false, None),
        };
        let name = changes.name;

        let row = sqlx::query_as::<_, BundleRow>(
            r#"
            UPDATE permission_bundles
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(bundle_id.as_uuid())
        .bind(name.as_ref().map(|name| name.as_str()))
        .bind(replace_description)
        .bind(description.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "update bundle",
                name.as_ref().map(|name| {
                    (
                        ConflictKind::DuplicateName,
                        format!("bundle '{name}' already exists"),
                    )
                }),
                None,
            )
        })?
        .ok_or_else(|| bundle_not_found(bundle_id))?;

        PermissionBundle::try_from(row)
    }

    async fn delete_bundle(&self, bundle_id: BundleId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM permission_bundles
            WHERE id = $1
            "#,
        )
        .bind(bundle_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "delete bundle", None, None))?;

        if result.rows_affected() == 0 {
            return Err(bundle_not_found(bundle_id));
        }

        Ok(())
    }

    async fn insert_bundle_grants(
        &self,
        bundle_id: BundleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<usize> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let bundle_exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM permission_bundles WHERE id = $1)
            "#,
        )
        .bind(bundle_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| read_error(error, "resolve bundle"))?;

        if !bundle_exists {
            return Err(bundle_not_found(bundle_id));
        }

        let inserted = insert_grants(&mut transaction, bundle_id, permission_ids).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(inserted)
    }

    async fn remove_bundle_grant(
        &self,
        bundle_id: BundleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM bundle_permissions
            WHERE bundle_id = $1 AND permission_id = $2
            "#,
        )
        .bind(bundle_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "remove bundle grant", None, None))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not part of bundle '{bundle_id}'"
            )));
        }

        Ok(())
    }
}

async fn insert_grants(
    transaction: &mut Transaction<'_, Postgres>,
    bundle_id: BundleId,
    permission_ids: &[PermissionId],
) -> AppResult<usize> {
    if permission_ids.is_empty() {
        return Ok(0);
    }

    let ids: Vec<Uuid> = permission_ids.iter().map(PermissionId::as_uuid).collect();
    let result = sqlx::query(
        r#"
        INSERT INTO bundle_permissions (bundle_id, permission_id)
        SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(bundle_id.as_uuid())
    .bind(ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        write_error(
            error,
            "insert bundle grants",
            Some((
                ConflictKind::DuplicateGrant,
                format!("bundle '{bundle_id}' already holds one of the permissions"),
            )),
            Some("one or more permissions do not exist".to_owned()),
        )
    })?;

    usize::try_from(result.rows_affected())
        .map_err(|error| AppError::Internal(format!("grant count overflow: {error}")))
}

fn bundle_not_found(bundle_id: BundleId) -> AppError {
    AppError::NotFound(format!("bundle '{bundle_id}' not found"))
}
