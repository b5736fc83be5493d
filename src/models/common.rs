use crate::error::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: ApiError,
}

/// Body of the `PATCH /{resource}/{id}/status` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    #[schema(example = "suspended")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Parses a wire status value against the allow-list encoded by `T`'s serde names.
pub fn parse_status<T: DeserializeOwned>(raw: Option<&str>) -> AppResult<T> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::ValidationError("Invalid status".to_string()))?;

    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| AppError::ValidationError("Invalid status".to_string()))
}

/// Treats a missing, blank or `"all"` filter as no filter.
pub fn active_filter(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

/// Parses an optional list filter; unknown values are rejected like status updates.
pub fn parse_filter<T: DeserializeOwned>(raw: Option<&str>) -> AppResult<Option<T>> {
    match active_filter(raw) {
        Some(value) => parse_status(Some(value)).map(Some),
        None => Ok(None),
    }
}
