use rolegate_domain::Permission;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for permission registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub entity: String,
    pub operation: String,
    #[serde(default)]
    #[ts(optional)]
    pub description: Option<String>,
}

/// Incoming payload for granting several permissions at once.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-permissions-request.ts"
)]
pub struct AssignPermissionsRequest {
    pub permission_ids: Vec<String>,
}

/// API representation of a permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: String,
    pub key: String,
    pub entity: String,
    pub operation: String,
    pub description: Option<String>,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id().to_string(),
            key: value.key().as_str().to_owned(),
            entity: value.entity().to_owned(),
            operation: value.operation().to_owned(),
            description: value.description().map(str::to_owned),
        }
    }
}
