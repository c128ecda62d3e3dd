use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Envelope wrapping every successful payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/data-response.ts"
)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Number of grants a batch actually inserted.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-count-response.ts"
)]
pub struct GrantCountResponse {
    pub inserted: u32,
}

impl GrantCountResponse {
    pub fn new(inserted: usize) -> Self {
        Self {
            inserted: u32::try_from(inserted).unwrap_or(u32::MAX),
        }
    }
}
