use rolegate_domain::{Role, RoleWithPermissions};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PermissionResponse;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    #[ts(optional)]
    pub disabled: Option<bool>,
}

/// Incoming payload for a partial role update. The slug cannot change.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub disabled: Option<bool>,
}

/// Incoming payload for copying a bundle into a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-bundle-request.ts"
)]
pub struct AssignBundleRequest {
    pub bundle_id: String,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub disabled: bool,
    pub created_at: String,
}

/// API representation of a role with its grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-detail-response.ts"
)]
pub struct RoleDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub role: RoleResponse,
    pub permissions: Vec<PermissionResponse>,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self::from(&value)
    }
}

impl From<&Role> for RoleResponse {
    fn from(value: &Role) -> Self {
        Self {
            id: value.id().to_string(),
            slug: value.slug().as_str().to_owned(),
            name: value.name().as_str().to_owned(),
            disabled: value.is_disabled(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

impl From<RoleWithPermissions> for RoleDetailResponse {
    fn from(value: RoleWithPermissions) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}
