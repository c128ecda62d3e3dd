use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{CreateBundleInput, UpdateBundleInput};
use rolegate_core::UserIdentity;

use crate::dto::{
    AssignPermissionsRequest, BundleDetailResponse, BundleResponse, CreateBundleRequest,
    DataResponse, GrantCountResponse, UpdateBundleRequest,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_bundles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<Vec<BundleDetailResponse>>>> {
    let bundles = state
        .bundle_service
        .list_bundles(&user)
        .await?
        .into_iter()
        .map(BundleDetailResponse::from)
        .collect();

    Ok(Json(DataResponse::new(bundles)))
}

pub async fn get_bundle_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bundle_id): Path<String>,
) -> ApiResult<Json<DataResponse<BundleDetailResponse>>> {
    let bundle = state
        .bundle_service
        .get_bundle(&user, bundle_id.as_str())
        .await?;

    Ok(Json(DataResponse::new(BundleDetailResponse::from(bundle))))
}

pub async fn create_bundle_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreateBundleRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<BundleResponse>>)> {
    let bundle = state
        .bundle_service
        .create_bundle(
            &user,
            CreateBundleInput {
                name: payload.name,
                description: payload.description,
                permission_ids: payload.permission_ids.unwrap_or_default(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(BundleResponse::from(bundle))),
    ))
}

pub async fn update_bundle_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bundle_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateBundleRequest>,
) -> ApiResult<Json<DataResponse<BundleResponse>>> {
    let bundle = state
        .bundle_service
        .update_bundle(
            &user,
            bundle_id.as_str(),
            UpdateBundleInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(BundleResponse::from(bundle))))
}

pub async fn delete_bundle_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bundle_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .bundle_service
        .delete_bundle(&user, bundle_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_bundle_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bundle_id): Path<String>,
    ApiJson(payload): ApiJson<AssignPermissionsRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<GrantCountResponse>>)> {
    let inserted = state
        .bundle_service
        .assign_permissions(&user, bundle_id.as_str(), &payload.permission_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GrantCountResponse::new(inserted))),
    ))
}

pub async fn remove_bundle_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((bundle_id, permission_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .bundle_service
        .remove_permission(
            &user,
            bundle_id.as_str(),
            permission_id.as_str(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
