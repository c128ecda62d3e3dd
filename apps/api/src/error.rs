use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegate_core::AppError;
use tracing::error;

mod types;

pub use types::{ErrorResponse, FieldViolationResponse};

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_, _) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let category = self.0.category().to_owned();

        let payload = match self.0 {
            AppError::Internal(detail) => {
                error!(detail = %detail, "request failed with internal error");
                ErrorResponse {
                    category,
                    message: "internal server error".to_owned(),
                    details: None,
                }
            }
            AppError::InvalidFields(violations) => ErrorResponse {
                category,
                message: "request validation failed".to_owned(),
                details: Some(
                    violations
                        .into_iter()
                        .map(FieldViolationResponse::from)
                        .collect(),
                ),
            },
            other => ErrorResponse {
                category,
                message: other.to_string(),
                details: None,
            },
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use rolegate_core::{AppError, ConflictKind, FieldViolation};

    use super::ApiError;

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(error).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        (
            status,
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
        )
    }

    #[tokio::test]
    async fn categories_map_to_statuses() {
        let cases = [
            (
                AppError::Validation("bad".to_owned()),
                StatusCode::BAD_REQUEST,
                "validation_failed",
            ),
            (
                AppError::Unauthorized("who".to_owned()),
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
            ),
            (
                AppError::Forbidden("no".to_owned()),
                StatusCode::FORBIDDEN,
                "insufficient_permission",
            ),
            (
                AppError::NotFound("gone".to_owned()),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                AppError::Conflict(ConflictKind::DuplicateSlug, "taken".to_owned()),
                StatusCode::CONFLICT,
                "conflict.duplicate_slug",
            ),
        ];

        for (error, expected_status, expected_category) in cases {
            let (status, body) = body_of(error).await;
            assert_eq!(status, expected_status);
            assert_eq!(body["category"], expected_category);
            assert!(body.get("details").is_none());
        }
    }

    #[tokio::test]
    async fn invalid_fields_are_listed_in_details() {
        let (status, body) = body_of(AppError::InvalidFields(vec![
            FieldViolation::new("slug", "slug is required"),
            FieldViolation::new("name", "name is required"),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["category"], "validation_failed");
        assert_eq!(body["details"][0]["field"], "slug");
        assert_eq!(body["details"][1]["field"], "name");
    }

    #[tokio::test]
    async fn internal_details_are_not_exposed() {
        let (status, body) = body_of(AppError::Internal(
            "failed to list roles: connection refused".to_owned(),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["category"], "internal_failure");
        assert_eq!(body["message"], "internal server error");
    }
}
