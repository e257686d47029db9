use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

use super::ApiError;
use super::ApiSuccess;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Clear the `accessToken` cookie. Tokens handed to mobile clients stay valid until they expire.
pub async fn logout<S: AuthServicePort>(
    State(state): State<AppState<S>>,
) -> Result<Response, ApiError> {
    let cookie = state
        .cookies
        .cleared()
        .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {}", e)))?;

    Ok((
        [(SET_COOKIE, cookie)],
        ApiSuccess::without_data(StatusCode::OK, "Logout successful"),
    )
        .into_response())
}
