use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use rolegate_application::AuthorizationRepository;
use rolegate_core::{AppResult, UserId};
use rolegate_domain::{RoleWithPermissions, UserWithRole};

use crate::postgres_rows::{RoleRow, UserRow, joined_permission, read_error};

/// PostgreSQL-backed repository for effective permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        Ok(fetch_users_with_roles(&self.pool, Some(user_id))
            .await?
            .into_iter()
            .next())
    }
}

#[derive(Debug, FromRow)]
struct UserGrantRow {
    user_id: Uuid,
    email: String,
    user_name: String,
    user_created_at: DateTime<Utc>,
    role_id: Option<Uuid>,
    role_slug: Option<String>,
    role_name: Option<String>,
    role_disabled: Option<bool>,
    role_created_at: Option<DateTime<Utc>>,
    permission_id: Option<Uuid>,
    permission_key: Option<String>,
    permission_description: Option<String>,
}

/// Loads users joined to their role and grants, flattened to one record per
/// user. Users come newest first; each role's permissions by entity then
/// operation.
pub(crate) async fn fetch_users_with_roles(
    pool: &PgPool,
    user_id: Option<UserId>,
) -> AppResult<Vec<UserWithRole>> {
    let rows = sqlx::query_as::<_, UserGrantRow>(
        r#"
        SELECT
            users.id AS user_id,
            users.email,
            users.name AS user_name,
            users.created_at AS user_created_at,
            roles.id AS role_id,
            roles.slug AS role_slug,
            roles.name AS role_name,
            roles.disabled AS role_disabled,
            roles.created_at AS role_created_at,
            permissions.id AS permission_id,
            permissions.key AS permission_key,
            permissions.description AS permission_description
        FROM users
        LEFT JOIN roles
            ON roles.id = users.role_id
        LEFT JOIN role_permissions AS grants
            ON grants.role_id = roles.id
        LEFT JOIN permissions
            ON permissions.id = grants.permission_id
        WHERE $1::uuid IS NULL OR users.id = $1
        ORDER BY users.created_at DESC, users.id, permissions.entity, permissions.operation
        "#,
    )
    .bind(user_id.map(|user_id| user_id.as_uuid()))
    .fetch_all(pool)
    .await
    .map_err(|error| read_error(error, "load users with roles"))?;

    let mut users: Vec<UserWithRole> = Vec::new();
    for row in rows {
        let permission = joined_permission(
            row.permission_id,
            row.permission_key,
            row.permission_description,
        )?;

        if let Some(current) = users.last_mut()
            && current.user.id().as_uuid() == row.user_id
        {
            if let (Some(role), Some(permission)) = (current.role.as_mut(), permission) {
                role.permissions.push(permission);
            }
            continue;
        }

        let role = match (
            row.role_id,
            row.role_slug,
            row.role_name,
            row.role_disabled,
            row.role_created_at,
        ) {
            (Some(id), Some(slug), Some(name), Some(disabled), Some(created_at)) => {
                Some(RoleWithPermissions {
                    role: RoleRow {
                        id,
                        slug,
                        name,
                        disabled,
                        created_at,
                    }
                    .try_into()?,
                    permissions: permission.into_iter().collect(),
                })
            }
            _ => None,
        };

        users.push(UserWithRole {
            user: UserRow {
                id: row.user_id,
                email: row.email,
                name: row.user_name,
                role_id: row.role_id,
                created_at: row.user_created_at,
            }
            .try_into()?,
            role,
        });
    }

    Ok(users)
}
