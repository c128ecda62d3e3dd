use rolegate_domain::{User, UserWithRole};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::RoleDetailResponse;

/// Incoming payload for account creation by an administrator.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role_id: String,
}

/// Incoming payload for a partial user update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub role_id: Option<String>,
}

/// API representation of a stored account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role_id: Option<String>,
    pub created_at: String,
}

/// API representation of an account joined to its role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-with-role-response.ts"
)]
pub struct UserWithRoleResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: UserResponse,
    pub role: Option<RoleDetailResponse>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id().to_string(),
            email: value.email().as_str().to_owned(),
            name: value.name().as_str().to_owned(),
            role_id: value.role_id().map(|role_id| role_id.to_string()),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

impl From<UserWithRole> for UserWithRoleResponse {
    fn from(value: UserWithRole) -> Self {
        Self {
            user: UserResponse::from(value.user),
            role: value.role.map(RoleDetailResponse::from),
        }
    }
}
