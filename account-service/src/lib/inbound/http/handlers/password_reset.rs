use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::field_errors;
use super::json_body;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::ValidationError;
use crate::account::models::EmailAddress;
use crate::account::models::NewPassword;
use crate::account::ports::AuthServicePort;
use crate::account::verification::TokenValue;
use crate::inbound::http::router::AppState;

pub async fn request_password_reset<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<PasswordResetEmailRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let email = EmailAddress::new(json_body(payload)?.email)
        .map_err(|e| field_errors([Some(ValidationError::from(e))]))?;

    state.auth_service.request_password_reset(&email).await?;

    Ok(ApiSuccess::without_data(
        StatusCode::OK,
        "Password reset email sent. Reset your password within 30 minutes.",
    ))
}

pub async fn reset_password<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let body = json_body(payload)?;

    let token = TokenValue::parse(body.token.trim()).map_err(ValidationError::from);
    let new_password = NewPassword::new(body.new_password).map_err(ValidationError::from);
    let (token, new_password) = match (token, new_password) {
        (Ok(token), Ok(new_password)) => (token, new_password),
        (token, new_password) => return Err(field_errors([token.err(), new_password.err()])),
    };

    state.auth_service.reset_password(&token, new_password).await?;

    Ok(ApiSuccess::without_data(StatusCode::OK, "Password reset successful"))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordResetEmailRequest {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[serde(default)]
    token: String,
    #[serde(default)]
    new_password: String,
}
