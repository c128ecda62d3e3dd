use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{CreateRoleInput, UpdateRoleInput};
use rolegate_core::UserIdentity;

use crate::dto::{
    AssignBundleRequest, AssignPermissionsRequest, CreateRoleRequest, DataResponse,
    GrantCountResponse, RoleDetailResponse, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<Vec<RoleResponse>>>> {
    let roles = state
        .role_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(DataResponse::new(roles)))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<DataResponse<RoleDetailResponse>>> {
    let role = state
        .role_service
        .get_role(&user, role_id.as_str())
        .await?;

    Ok(Json(DataResponse::new(RoleDetailResponse::from(role))))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<RoleResponse>>)> {
    let role = state
        .role_service
        .create_role(
            &user,
            CreateRoleInput {
                slug: payload.slug,
                name: payload.name,
                disabled: payload.disabled.unwrap_or(false),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(RoleResponse::from(role))),
    ))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateRoleRequest>,
) -> ApiResult<Json<DataResponse<RoleResponse>>> {
    let role = state
        .role_service
        .update_role(
            &user,
            role_id.as_str(),
            UpdateRoleInput {
                name: payload.name,
                disabled: payload.disabled,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(RoleResponse::from(role))))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .delete_role(&user, role_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    ApiJson(payload): ApiJson<AssignPermissionsRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<GrantCountResponse>>)> {
    let inserted = state
        .role_service
        .assign_permissions(&user, role_id.as_str(), &payload.permission_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GrantCountResponse::new(inserted))),
    ))
}

pub async fn remove_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .remove_permission(
            &user,
            role_id.as_str(),
            permission_id.as_str(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Copies the bundle's current permissions; grants already held are skipped.
pub async fn assign_role_bundle_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    ApiJson(payload): ApiJson<AssignBundleRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<GrantCountResponse>>)> {
    let inserted = state
        .role_service
        .assign_bundle(&user, role_id.as_str(), &payload.bundle_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GrantCountResponse::new(inserted))),
    ))
}
