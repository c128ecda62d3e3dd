//! Row shapes shared by the PostgreSQL adapters and their conversion into
//! domain records.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use rolegate_core::{AppError, AppResult, ConflictKind, NonEmptyString, UserId};
use rolegate_domain::{
    BundleId, EmailAddress, Permission, PermissionBundle, PermissionId, PermissionKey, Role,
    RoleId, RoleSlug, User,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) id: Uuid,
    pub(crate) key: String,
    pub(crate) description: Option<String>,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        permission_from_parts(row.id, row.key.as_str(), row.description)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) id: Uuid,
    pub(crate) slug: String,
    pub(crate) name: String,
    pub(crate) disabled: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Role::new(
            RoleId::from_uuid(row.id),
            RoleSlug::new(row.slug).map_err(|error| corrupt("role slug", error))?,
            NonEmptyString::new(row.name).map_err(|error| corrupt("role name", error))?,
            row.disabled,
            row.created_at,
        ))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) role_id: Option<Uuid>,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::new(
            UserId::from_uuid(row.id),
            EmailAddress::new(row.email).map_err(|error| corrupt("user email", error))?,
            NonEmptyString::new(row.name).map_err(|error| corrupt("user name", error))?,
            row.role_id.map(RoleId::from_uuid),
            row.created_at,
        ))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BundleRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

impl TryFrom<BundleRow> for PermissionBundle {
    type Error = AppError;

    fn try_from(row: BundleRow) -> Result<Self, Self::Error> {
        Ok(PermissionBundle::new(
            BundleId::from_uuid(row.id),
            NonEmptyString::new(row.name).map_err(|error| corrupt("bundle name", error))?,
            row.description,
        ))
    }
}

/// Builds a permission from the nullable columns of a left join.
pub(crate) fn joined_permission(
    id: Option<Uuid>,
    key: Option<String>,
    description: Option<String>,
) -> AppResult<Option<Permission>> {
    match (id, key) {
        (Some(id), Some(key)) => permission_from_parts(id, key.as_str(), description).map(Some),
        _ => Ok(None),
    }
}

fn permission_from_parts(id: Uuid, key: &str, description: Option<String>) -> AppResult<Permission> {
    let key = PermissionKey::parse(key).map_err(|error| corrupt("permission key", error))?;
    Ok(Permission::new(PermissionId::from_uuid(id), key, description))
}

fn corrupt(column: &str, error: AppError) -> AppError {
    AppError::Internal(format!("stored {column} is invalid: {error}"))
}

/// Maps a failed write, turning constraint violations into typed errors.
pub(crate) fn write_error(
    error: sqlx::Error,
    operation: &str,
    conflict: Option<(ConflictKind, String)>,
    missing: Option<String>,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match (database_error.code().as_deref(), conflict, missing) {
            (Some(UNIQUE_VIOLATION), Some((kind, message)), _) => {
                return AppError::Conflict(kind, message);
            }
            (Some(FOREIGN_KEY_VIOLATION), _, Some(message)) => {
                return AppError::NotFound(message);
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Maps a failed read.
pub(crate) fn read_error(error: sqlx::Error, operation: &str) -> AppError {
    AppError::Internal(format!("failed to {operation}: {error}"))
}
