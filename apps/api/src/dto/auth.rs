use rolegate_domain::UserProfile;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{PermissionResponse, RoleResponse};

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user together with the permissions they currently hold.
///
/// `permissions` is the effective set; it can be empty while `role` is
/// present when the role is disabled.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-profile-response.ts"
)]
pub struct UserProfileResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Option<RoleResponse>,
    pub permissions: Vec<PermissionResponse>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id().to_string(),
            email: value.email().as_str().to_owned(),
            name: value.name().to_owned(),
            role: value.role().map(|role| RoleResponse::from(&role.role)),
            permissions: value
                .permissions()
                .iter()
                .cloned()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}
