use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::{GrantInsertMode, NewRole, RoleChanges, RoleRepository};
use rolegate_core::{AppError, AppResult, ConflictKind};
use rolegate_domain::{PermissionId, Role, RoleId, RoleSlug, RoleWithPermissions};

use crate::postgres_rows::{RoleRow, joined_permission, read_error, write_error};

/// PostgreSQL-backed repository for roles and role grants.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleGrantRow {
    #[sqlx(flatten)]
    role: RoleRow,
    permission_id: Option<uuid::Uuid>,
    permission_key: Option<String>,
    permission_description: Option<String>,
}

mod grants;


#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, slug, name, disabled, created_at
            FROM roles
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| read_error(error, "list roles"))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn find_role_with_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Option<RoleWithPermissions>> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            r#"
            SELECT
                roles.id,
                roles.slug,
                roles.name,
                roles.disabled,
                roles.created_at,
                permissions.id AS permission_id,
                permissions.key AS permission_key,
                permissions.description AS permission_description
            FROM roles
            LEFT JOIN role_permissions AS grants
                ON grants.role_id = roles.id
            LEFT JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE roles.id = $1
            ORDER BY permissions.entity, permissions.operation
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| read_error(error, "find role"))?;

        let mut role: Option<RoleWithPermissions> = None;
        for row in rows {
            let permission = joined_permission(
                row.permission_id,
                row.permission_key,
                row.permission_description,
            )?;

            if role.is_none() {
                role = Some(RoleWithPermissions {
                    role: Role::try_from(row.role)?,
                    permissions: Vec::new(),
                });
            }
            if let (Some(current), Some(permission)) = (role.as_mut(), permission) {
                current.permissions.push(permission);
            }
        }

        Ok(role)
    }

    async fn find_role_by_slug(&self, slug: &RoleSlug) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, slug, name, disabled, created_at
            FROM roles
            WHERE slug = $1
            "#,
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| read_error(error, "find role by slug"))?
        .map(Role::try_from)
        .transpose()
    }

    async fn create_role(&self, input: NewRole) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (id, slug, name, disabled)
            VALUES ($1, $2, $3, $4)
            RETURNING id, slug, name, disabled, created_at
            "#,
        )
        .bind(RoleId::new().as_uuid())
        .bind(input.slug.as_str())
        .bind(input.name.as_str())
        .bind(input.disabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "create role",
                Some((
                    ConflictKind::DuplicateSlug,
                    format!("role slug '{}' is already taken", input.slug),
                )),
                None,
            )
        })?;

        Role::try_from(row)
    }

    async fn update_role(&self, role_id: RoleId, changes: RoleChanges) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                disabled = COALESCE($3, disabled)
            WHERE id = $1
            RETURNING id, slug, name, disabled, created_at
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(changes.name.as_ref().map(|name| name.as_str()))
        .bind(changes.disabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| write_error(error, "update role", None, None))?
        .ok_or_else(|| role_not_found(role_id))?;

        Role::try_from(row)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "delete role", None, None))?;

        if result.rows_affected() == 0 {
            return Err(role_not_found(role_id));
        }

        Ok(())
    }

    async fn insert_role_grants(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        mode: GrantInsertMode,
    ) -> AppResult<usize> {
        self.insert_role_grants_impl(role_id, permission_ids, mode)
            .await
    }

    async fn remove_role_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.remove_role_grant_impl(role_id, permission_id).await
    }
}

fn role_not_found(role_id: RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' not found"))
}
