use axum::Json;
use axum::extract::State;
use rolegate_core::AppError;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{DataResponse, LoginRequest, UserProfileResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// POST /auth/login - Authenticate with email+password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<DataResponse<UserProfileResponse>>> {
    let Some(identity) = state
        .authentication_service
        .login(&payload.email, &payload.password)
        .await?
    else {
        // Same answer for unknown email and wrong password.
        return Err(AppError::Unauthorized("invalid email or password".to_owned()).into());
    };

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    let profile = state.user_admin_service.me(&identity).await?;
    info!(user_id = %identity.user_id(), "session started");

    Ok(Json(DataResponse::new(UserProfileResponse::from(profile))))
}
