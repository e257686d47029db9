use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::errors::ApiError;
use super::errors::ErrorCode;
use super::errors::FieldError;
use crate::account::errors::ValidationError;

pub mod current_account;
pub mod login;
pub mod logout;
pub mod password_reset;
pub mod resend_verification;
pub mod signup;
pub mod verify_email;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponseBody<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::success(message, Some(data))))
    }
}

impl ApiSuccess<()> {
    pub fn without_data(status: StatusCode, message: impl Into<String>) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::success(message, None)))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Uniform response envelope for successes and failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseBody<T: Serialize> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    /// Epoch milliseconds
    timestamp: i64,
}

impl<T: Serialize> ApiResponseBody<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_code: None,
            data,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

impl ApiResponseBody<Vec<FieldError>> {
    pub fn failure(code: ErrorCode, fields: Option<Vec<FieldError>>) -> Self {
        Self {
            success: false,
            message: code.message().to_string(),
            error_code: Some(code.code()),
            data: fields,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Unwrap a JSON body, reporting any rejection as `INVALID_JSON`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected request body");
        ApiError::Code(ErrorCode::InvalidJson)
    })
}

/// Collect every failed field of a request into one `INVALID_INPUT` error.
pub(crate) fn field_errors<const N: usize>(errors: [Option<ValidationError>; N]) -> ApiError {
    ApiError::Validation(
        errors
            .iter()
            .flatten()
            .map(FieldError::from)
            .collect(),
    )
}
