use rolegate_domain::{BundleWithPermissions, PermissionBundle};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PermissionResponse;

/// Incoming payload for bundle creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-bundle-request.ts"
)]
pub struct CreateBundleRequest {
    pub name: String,
    #[serde(default)]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub permission_ids: Option<Vec<String>>,
}

/// Incoming payload for a partial bundle update. A blank description clears it.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-bundle-request.ts"
)]
pub struct UpdateBundleRequest {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub description: Option<String>,
}

/// API representation of a bundle.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bundle-response.ts"
)]
pub struct BundleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// API representation of a bundle with its permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bundle-detail-response.ts"
)]
pub struct BundleDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub bundle: BundleResponse,
    pub permissions: Vec<PermissionResponse>,
}

impl From<PermissionBundle> for BundleResponse {
    fn from(value: PermissionBundle) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            description: value.description().map(str::to_owned),
        }
    }
}

impl From<BundleWithPermissions> for BundleDetailResponse {
    fn from(value: BundleWithPermissions) -> Self {
        Self {
            bundle: BundleResponse::from(value.bundle),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}
