use rolegate_core::FieldViolation;
use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    /// Stable machine-readable code such as `conflict.duplicate_slug`.
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub details: Option<Vec<FieldViolationResponse>>,
}

/// One rejected request field.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-violation-response.ts"
)]
pub struct FieldViolationResponse {
    pub field: String,
    pub message: String,
}

impl From<FieldViolation> for FieldViolationResponse {
    fn from(value: FieldViolation) -> Self {
        Self {
            field: value.field,
            message: value.message,
        }
    }
}
