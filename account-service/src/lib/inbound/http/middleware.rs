use auth::Authenticator;
use auth::JwtError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::cookies::find_cookie;
use super::cookies::ACCESS_TOKEN_COOKIE;
use super::errors::ApiError;
use super::errors::ErrorCode;
use crate::account::models::PublicId;
use crate::account::models::Role;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Identity resolved from a valid access token, stored in request extensions.
///
/// Also an extractor: handlers that take it reject unauthenticated requests
/// with `UNAUTHORIZED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub public_id: PublicId,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAccount>()
            .cloned()
            .ok_or(ApiError::Code(ErrorCode::Unauthorized))
    }
}

/// Middleware resolving the caller's identity from the access token.
///
/// Requests without a token pass through unauthenticated; a present but
/// expired or invalid token is answered with 401 before any handler runs.
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match extract_credential(req.headers()) {
        Some(token) => Some(resolve_identity(&state.authenticator, token)?),
        None => None,
    };

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}

/// Access token from `Authorization: Bearer`, falling back to the `accessToken` cookie.
pub fn extract_credential(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| find_cookie(headers, ACCESS_TOKEN_COOKIE).filter(|t| !t.is_empty()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Validate `token` and turn its claims into an identity.
pub fn resolve_identity(
    authenticator: &Authenticator,
    token: &str,
) -> Result<AuthenticatedAccount, ApiError> {
    let claims = authenticator.validate_token(token).map_err(|e| match e {
        JwtError::TokenExpired => {
            tracing::debug!("Access token expired");
            ApiError::Code(ErrorCode::TokenExpired)
        }
        other => {
            tracing::warn!(error = %other, "Access token rejected");
            ApiError::Code(ErrorCode::TokenInvalid)
        }
    })?;

    let role = Role::from_authority(&claims.role).ok_or_else(|| {
        tracing::warn!(role = %claims.role, "Access token carries unknown authority");
        ApiError::Code(ErrorCode::TokenInvalid)
    })?;

    let public_id = PublicId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Access token subject is not a public id");
        ApiError::Code(ErrorCode::TokenInvalid)
    })?;

    Ok(AuthenticatedAccount {
        public_id,
        email: claims.email,
        role,
    })
}
