use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rolegate_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{DataResponse, UserProfileResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let identity = read_identity(&session).await?;

    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to flush session: {error}")))?;

    if let Some(identity) = identity {
        info!(user_id = %identity.user_id(), "session ended");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<DataResponse<UserProfileResponse>>> {
    let identity = read_identity(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let profile = state.user_admin_service.me(&identity).await?;
    Ok(Json(DataResponse::new(UserProfileResponse::from(profile))))
}

async fn read_identity(session: &Session) -> Result<Option<UserIdentity>, AppError> {
    session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))
}
