use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use super::handlers::ApiResponseBody;
use crate::account::errors::AuthError;
use crate::account::errors::ValidationError;

/// Stable error codes returned to clients, each bound to one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    InvalidJson,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
    Unauthorized,
    Forbidden,
    TokenExpired,
    TokenInvalid,
    AccountDisabled,
    AccountLocked,
    BadCredentials,
    UserNotFound,
    DuplicateEmail,
    EmailSendFailed,
    VerificationTokenNotFound,
    VerificationTokenExpired,
    VerificationTokenAlreadyUsed,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidJson => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound
            | ErrorCode::UserNotFound
            | ErrorCode::VerificationTokenNotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::InternalServerError | ErrorCode::EmailSendFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::Unauthorized
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid
            | ErrorCode::BadCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden | ErrorCode::AccountDisabled | ErrorCode::AccountLocked => {
                StatusCode::FORBIDDEN
            }
            ErrorCode::DuplicateEmail => StatusCode::CONFLICT,
            ErrorCode::VerificationTokenExpired | ErrorCode::VerificationTokenAlreadyUsed => {
                StatusCode::GONE
            }
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::TokenInvalid => "TOKEN_INVALID",
            ErrorCode::AccountDisabled => "ACCOUNT_DISABLED",
            ErrorCode::AccountLocked => "ACCOUNT_LOCKED",
            ErrorCode::BadCredentials => "BAD_CREDENTIALS",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::EmailSendFailed => "EMAIL_SEND_FAILED",
            ErrorCode::VerificationTokenNotFound => "VERIFICATION_TOKEN_NOT_FOUND",
            ErrorCode::VerificationTokenExpired => "VERIFICATION_TOKEN_EXPIRED",
            ErrorCode::VerificationTokenAlreadyUsed => "VERIFICATION_TOKEN_ALREADY_USED",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input",
            ErrorCode::InvalidJson => "Malformed JSON request body",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::MethodNotAllowed => "Method not allowed",
            ErrorCode::InternalServerError => "Internal server error",
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Access denied",
            ErrorCode::TokenExpired => "Access token has expired",
            ErrorCode::TokenInvalid => "Access token is invalid",
            ErrorCode::AccountDisabled => "Email address has not been verified",
            ErrorCode::AccountLocked => "Account is locked",
            ErrorCode::BadCredentials => "Invalid email or password",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::DuplicateEmail => "Email is already registered",
            ErrorCode::EmailSendFailed => "Failed to send email",
            ErrorCode::VerificationTokenNotFound => "Verification token not found",
            ErrorCode::VerificationTokenExpired => "Verification token has expired",
            ErrorCode::VerificationTokenAlreadyUsed => "Verification token has already been used",
        }
    }
}

/// Single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Classified failure reported with its code's fixed message.
    Code(ErrorCode),
    /// `INVALID_INPUT` with per-field details.
    Validation(Vec<FieldError>),
    /// Unclassified failure; the detail is logged, never returned.
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Code(code) => *code,
            ApiError::Validation(_) => ErrorCode::InvalidInput,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        ApiError::Code(code)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(vec![FieldError::from(&err)])
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(err) => ApiError::from(err),
            AuthError::DuplicateEmail(_) => ErrorCode::DuplicateEmail.into(),
            AuthError::UserNotFound(_) => ErrorCode::UserNotFound.into(),
            AuthError::BadCredentials => ErrorCode::BadCredentials.into(),
            AuthError::AccountDisabled => ErrorCode::AccountDisabled.into(),
            AuthError::AccountLocked => ErrorCode::AccountLocked.into(),
            AuthError::TokenNotFound => ErrorCode::VerificationTokenNotFound.into(),
            AuthError::TokenAlreadyUsed => ErrorCode::VerificationTokenAlreadyUsed.into(),
            AuthError::TokenExpired => ErrorCode::VerificationTokenExpired.into(),
            AuthError::EmailSend(_) => ErrorCode::EmailSendFailed.into(),
            AuthError::DatabaseError(_) | AuthError::Unknown(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = match self {
            ApiError::Code(_) => ApiResponseBody::failure(code, None),
            ApiError::Validation(fields) => ApiResponseBody::failure(code, Some(fields)),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Unhandled error");
                ApiResponseBody::failure(code, None)
            }
        };

        (code.status(), Json(body)).into_response()
    }
}
