use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::CreatePermissionInput;
use rolegate_core::UserIdentity;

use crate::dto::{CreatePermissionRequest, DataResponse, PermissionResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<Vec<PermissionResponse>>>> {
    let permissions = state
        .permission_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(DataResponse::new(permissions)))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_id): Path<String>,
) -> ApiResult<Json<DataResponse<PermissionResponse>>> {
    let permission = state
        .permission_service
        .get_permission(&user, permission_id.as_str())
        .await?;

    Ok(Json(DataResponse::new(PermissionResponse::from(permission))))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<PermissionResponse>>)> {
    let permission = state
        .permission_service
        .create_permission(
            &user,
            CreatePermissionInput {
                entity: payload.entity,
                operation: payload.operation,
                description: payload.description,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(PermissionResponse::from(permission))),
    ))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .permission_service
        .delete_permission(&user, permission_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_permission_entities_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<Vec<String>>>> {
    let entities = state.permission_service.list_entities(&user).await?;
    Ok(Json(DataResponse::new(entities)))
}

pub async fn list_permission_operations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<Vec<String>>>> {
    let operations = state.permission_service.list_operations(&user).await?;
    Ok(Json(DataResponse::new(operations)))
}
