use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::account::errors::TokenFormatError;
use crate::account::models::AccountId;

/// How long a verification token stays consumable after creation.
pub const VERIFICATION_TOKEN_TTL_MINUTES: i64 = 30;

/// Purpose of a verification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    VerifyEmail,
    PasswordReset,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::VerifyEmail => "VERIFY_EMAIL",
            TokenType::PasswordReset => "PASSWORD_RESET",
        }
    }
}

impl std::str::FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VERIFY_EMAIL" => Ok(TokenType::VerifyEmail),
            "PASSWORD_RESET" => Ok(TokenType::PasswordReset),
            other => Err(format!("unknown token type: {}", other)),
        }
    }
}

/// Opaque bearer secret identifying a verification token.
///
/// Always a canonical hyphenated UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenValue(String);

impl TokenValue {
    const CANONICAL_LENGTH: usize = 36;

    /// Generate a fresh random token (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Accept a token supplied by a client.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a hyphenated UUID
    pub fn parse(token: &str) -> Result<Self, TokenFormatError> {
        if token.len() != Self::CANONICAL_LENGTH || Uuid::parse_str(token).is_err() {
            return Err(TokenFormatError::InvalidFormat);
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account write applied together with consuming a token.
///
/// Each variant touches one field only, so consumptions of different tokens
/// owned by the same account never overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEffect {
    /// PENDING becomes ACTIVE; any other status is left untouched
    ActivateAccount,
    /// Replace the owner's password hash
    ReplacePasswordHash(String),
}

/// Single-use, time-boxed secret proving control of an email address.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationToken {
    pub token: TokenValue,
    pub account_id: AccountId,
    pub token_type: TokenType,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl VerificationToken {
    /// Create a new unused token for `account_id`, expiring after the fixed TTL.
    pub fn issue(account_id: AccountId, token_type: TokenType, now: DateTime<Utc>) -> Self {
        Self {
            token: TokenValue::generate(),
            account_id,
            token_type,
            created_at: now,
            expires_at: now + Duration::minutes(VERIFICATION_TOKEN_TTL_MINUTES),
            used_at: None,
        }
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check that the token can still be consumed.
    ///
    /// The used check runs first: a token that is both used and expired reports as used.
    ///
    /// # Errors
    /// * `TokenAlreadyUsed` - Token was consumed before
    /// * `TokenExpired` - Token is past its expiry
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.is_used() {
            return Err(AuthError::TokenAlreadyUsed);
        }
        if self.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_at(now: DateTime<Utc>) -> VerificationToken {
        VerificationToken::issue(AccountId(7), TokenType::VerifyEmail, now)
    }

    #[test]
    fn test_issue_sets_fixed_expiry() {
        let now = Utc::now();
        let token = token_at(now);

        assert_eq!(token.expires_at - token.created_at, Duration::minutes(30));
        assert!(token.used_at.is_none());
        assert!(TokenValue::parse(token.token.as_str()).is_ok());
    }

    #[test]
    fn test_generated_tokens_are_distinct() {
        assert_ne!(TokenValue::generate(), TokenValue::generate());
    }

    #[test]
    fn test_usable_before_expiry() {
        let now = Utc::now();
        let token = token_at(now);

        assert!(token
            .ensure_usable(now + Duration::minutes(29))
            .is_ok());
    }

    #[test]
    fn test_expired_at_exact_expiry() {
        let now = Utc::now();
        let token = token_at(now);

        assert!(matches!(
            token.ensure_usable(token.expires_at),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_used_check_precedes_expiry_check() {
        let now = Utc::now();
        let mut token = token_at(now);
        token.used_at = Some(now);

        assert!(matches!(
            token.ensure_usable(now + Duration::hours(1)),
            Err(AuthError::TokenAlreadyUsed)
        ));
    }

    #[test]
    fn test_parse_requires_hyphenated_uuid() {
        assert!(TokenValue::parse("2f1c0e9a-5b7d-4c1e-9a3f-0d8e6b4a2c11").is_ok());
        assert!(TokenValue::parse("2F1C0E9A-5B7D-4C1E-9A3F-0D8E6B4A2C11").is_ok());
        assert_eq!(
            TokenValue::parse("2f1c0e9a5b7d4c1e9a3f0d8e6b4a2c11"),
            Err(TokenFormatError::InvalidFormat)
        );
        assert_eq!(
            TokenValue::parse("not-a-token"),
            Err(TokenFormatError::InvalidFormat)
        );
    }

    #[test]
    fn test_token_type_strings() {
        assert_eq!(TokenType::VerifyEmail.as_str(), "VERIFY_EMAIL");
        assert_eq!("PASSWORD_RESET".parse::<TokenType>(), Ok(TokenType::PasswordReset));
    }
}
