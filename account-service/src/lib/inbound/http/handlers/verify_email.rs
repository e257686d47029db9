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
use crate::account::ports::AuthServicePort;
use crate::account::verification::TokenValue;
use crate::inbound::http::router::AppState;

pub async fn verify_email<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let token = parse_token(&json_body(payload)?.token)?;

    state.auth_service.verify_email(&token).await?;

    Ok(ApiSuccess::without_data(StatusCode::OK, "Email verified"))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyEmailRequest {
    #[serde(default)]
    token: String,
}

pub(crate) fn parse_token(raw: &str) -> Result<TokenValue, ApiError> {
    TokenValue::parse(raw.trim()).map_err(|e| field_errors([Some(ValidationError::from(e))]))
}
