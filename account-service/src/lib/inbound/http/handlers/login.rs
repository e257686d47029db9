use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::field_errors;
use super::json_body;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::ValidationError;
use crate::account::models::EmailAddress;
use crate::account::models::LoginOutcome;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub const CLIENT_TYPE_HEADER: &str = "x-client-type";

/// How the issued access token travels back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// Token in an `HttpOnly` cookie only
    Web,
    /// Token in the response body only
    Mobile,
}

impl ClientType {
    /// Read `X-Client-Type`; absent means web, anything other than `web` means mobile.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(CLIENT_TYPE_HEADER).map(|v| v.to_str()) {
            None => ClientType::Web,
            Some(Ok(value)) if value.trim().eq_ignore_ascii_case("web") => ClientType::Web,
            Some(_) => ClientType::Mobile,
        }
    }
}

pub async fn login<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(payload)?;
    let email = body.validated_email()?;

    let outcome = state
        .auth_service
        .login(email.as_str(), &body.password)
        .await?;

    match ClientType::from_headers(&headers) {
        ClientType::Web => {
            let max_age = state.authenticator.token_validity().num_seconds();
            let cookie = state
                .cookies
                .access_token(&outcome.access_token, max_age)
                .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {}", e)))?;

            Ok((
                [(SET_COOKIE, cookie)],
                ApiSuccess::new(StatusCode::OK, "Login successful", LoginResponseData::without_token(outcome)),
            )
                .into_response())
        }
        ClientType::Mobile => Ok(ApiSuccess::new(
            StatusCode::OK,
            "Login successful",
            LoginResponseData::from(outcome),
        )
        .into_response()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl LoginRequest {
    fn validated_email(&self) -> Result<EmailAddress, ApiError> {
        EmailAddress::new(self.email.clone())
            .map_err(|e| field_errors([Some(ValidationError::from(e))]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub name: String,
    pub email: String,
}

impl LoginResponseData {
    fn without_token(outcome: LoginOutcome) -> Self {
        Self {
            access_token: None,
            ..Self::from(outcome)
        }
    }
}

impl From<LoginOutcome> for LoginResponseData {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: Some(outcome.access_token),
            name: outcome.name,
            email: outcome.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_client_type_defaults_to_web() {
        assert_eq!(ClientType::from_headers(&HeaderMap::new()), ClientType::Web);
    }

    #[test]
    fn test_client_type_is_case_insensitive() {
        let cases = [
            ("WEB", ClientType::Web),
            ("Web", ClientType::Web),
            ("mobile", ClientType::Mobile),
            ("ios", ClientType::Mobile),
        ];

        for (value, expected) in cases {
            let mut headers = HeaderMap::new();
            headers.insert(CLIENT_TYPE_HEADER, HeaderValue::from_static(value));
            assert_eq!(ClientType::from_headers(&headers), expected, "{}", value);
        }
    }

    #[test]
    fn test_web_response_omits_token() {
        let outcome = LoginOutcome {
            access_token: "jwt".to_string(),
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        };

        let json = serde_json::to_value(LoginResponseData::without_token(outcome)).unwrap();
        assert!(json.get("accessToken").is_none());
        assert_eq!(json["name"], "Alice");
    }
}
