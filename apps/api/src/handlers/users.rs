use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{CreateUserInput, UpdateUserInput};
use rolegate_core::UserIdentity;

use crate::dto::{
    CreateUserRequest, DataResponse, UpdateUserRequest, UserProfileResponse, UserResponse,
    UserWithRoleResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<Vec<UserWithRoleResponse>>>> {
    let users = state
        .user_admin_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserWithRoleResponse::from)
        .collect();

    Ok(Json(DataResponse::new(users)))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<DataResponse<UserProfileResponse>>> {
    let profile = state
        .user_admin_service
        .get_user(&user, user_id.as_str())
        .await?;

    Ok(Json(DataResponse::new(UserProfileResponse::from(profile))))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<UserProfileResponse>>)> {
    let profile = state
        .user_admin_service
        .create_user(
            &user,
            CreateUserInput {
                email: payload.email,
                name: payload.name,
                password: payload.password,
                role_id: payload.role_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(UserProfileResponse::from(profile))),
    ))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    let updated = state
        .user_admin_service
        .update_user(
            &user,
            user_id.as_str(),
            UpdateUserInput {
                name: payload.name,
                role_id: payload.role_id,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(UserResponse::from(updated))))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .user_admin_service
        .delete_user(&user, user_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me - Profile of the session's own user. Needs no permission.
pub async fn current_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DataResponse<UserProfileResponse>>> {
    let profile = state.user_admin_service.me(&user).await?;
    Ok(Json(DataResponse::new(UserProfileResponse::from(profile))))
}
