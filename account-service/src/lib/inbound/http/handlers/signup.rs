use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use super::field_errors;
use super::json_body;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::ValidationError;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::NewPassword;
use crate::account::models::PhoneNumber;
use crate::account::models::SignupCommand;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn signup<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let command = json_body(payload)?.try_into_command()?;

    state.auth_service.signup(command).await?;

    Ok((
        [(LOCATION, "/api/v1/users/me")],
        ApiSuccess::without_data(
            StatusCode::CREATED,
            "Signup successful. Verify your email within 30 minutes to log in.",
        ),
    )
        .into_response())
}

/// HTTP request body for signup (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    phone_number: Option<String>,
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, ApiError> {
        let name = DisplayName::new(self.name).map_err(ValidationError::from);
        let email = EmailAddress::new(self.email).map_err(ValidationError::from);
        let password = NewPassword::new(self.password).map_err(ValidationError::from);
        let phone_number = PhoneNumber::optional(self.phone_number).map_err(ValidationError::from);

        match (name, email, password, phone_number) {
            (Ok(name), Ok(email), Ok(password), Ok(phone_number)) => {
                Ok(SignupCommand::new(name, email, password, phone_number))
            }
            (name, email, password, phone_number) => Err(field_errors([
                name.err(),
                email.err(),
                password.err(),
                phone_number.err(),
            ])),
        }
    }
}
