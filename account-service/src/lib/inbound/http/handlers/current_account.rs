use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Account;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn current_account<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    identity: AuthenticatedAccount,
) -> Result<ApiSuccess<AccountResponseData>, ApiError> {
    let account = state.auth_service.get_account(&identity.public_id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "Request processed successfully",
        AccountResponseData::from(&account),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponseData {
    pub public_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub status: &'static str,
    pub role: &'static str,
}

impl From<&Account> for AccountResponseData {
    fn from(account: &Account) -> Self {
        Self {
            public_id: account.public_id.to_string(),
            name: account.name.to_string(),
            email: account.email.to_string(),
            phone_number: account.phone_number.as_ref().map(|p| p.as_str().to_string()),
            status: account.status.as_str(),
            role: account.role.as_str(),
        }
    }
}
