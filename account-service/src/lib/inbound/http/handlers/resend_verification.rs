use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use super::verify_email::parse_token;
use super::ApiError;
use super::ApiSuccess;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn resend_verification_email<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ResendVerificationRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let expired_token = parse_token(&json_body(payload)?.expired_token)?;

    state
        .auth_service
        .resend_verification_email(&expired_token)
        .await?;

    Ok(ApiSuccess::without_data(
        StatusCode::OK,
        "Verification email sent again. Verify your email within 30 minutes.",
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationRequest {
    #[serde(default)]
    expired_token: String,
}
