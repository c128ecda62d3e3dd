use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::{NewPermission, PermissionRepository};
use rolegate_core::{AppError, AppResult, ConflictKind};
use rolegate_domain::{Permission, PermissionId, PermissionKey};

use crate::postgres_rows::{PermissionRow, read_error, write_error};

/// PostgreSQL-backed permission catalogue.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description
            FROM permissions
            ORDER BY entity, operation
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| read_error(error, "list permissions"))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| read_error(error, "find permission"))?
        .map(Permission::try_from)
        .transpose()
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description
            FROM permissions
            WHERE key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| read_error(error, "find permission by key"))?
        .map(Permission::try_from)
        .transpose()
    }

    async fn create_permission(&self, input: NewPermission) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (id, entity, operation, key, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, key, description
            "#,
        )
        .bind(PermissionId::new().as_uuid())
        .bind(input.key.entity())
        .bind(input.key.operation())
        .bind(input.key.as_str())
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "create permission",
                Some((
                    ConflictKind::DuplicateKey,
                    format!("permission '{}' already exists", input.key),
                )),
                None,
            )
        })?;

        Permission::try_from(row)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "delete permission", None, None))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' not found"
            )));
        }

        Ok(())
    }

    async fn list_entities(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT entity
            FROM permissions
            ORDER BY entity
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| read_error(error, "list permission entities"))
    }

    async fn list_operations(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT operation
            FROM permissions
            ORDER BY operation
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| read_error(error, "list permission operations"))
    }
}
