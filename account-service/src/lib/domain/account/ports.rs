use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AuthError;
use crate::account::errors::EmailSendError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::LoginOutcome;
use crate::account::models::NewAccount;
use crate::account::models::NewPassword;
use crate::account::models::PublicId;
use crate::account::models::SignupCommand;
use crate::account::verification::TokenEffect;
use crate::account::verification::TokenValue;
use crate::account::verification::VerificationToken;

/// Port for authentication domain service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a PENDING account and send it a verification email.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `EmailSend` - Verification email could not be delivered
    /// * `DatabaseError` - Database operation failed
    async fn signup(&self, command: SignupCommand) -> Result<(), AuthError>;

    /// Check credentials and issue a signed access token.
    ///
    /// Read-only: nothing is persisted on success. The password is checked before
    /// the account status, so status is never revealed without valid credentials.
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown email or wrong password
    /// * `AccountLocked` - Account is banned or deleted
    /// * `AccountDisabled` - Email address not verified yet
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Consume a VERIFY_EMAIL token and activate its owner.
    ///
    /// # Errors
    /// * `TokenNotFound` - No such verification token
    /// * `TokenAlreadyUsed` - Token was consumed before (including a concurrent consumer)
    /// * `TokenExpired` - Token is past its expiry
    async fn verify_email(&self, token: &TokenValue) -> Result<(), AuthError>;

    /// Replace an unused (typically expired) VERIFY_EMAIL token and send a new email.
    ///
    /// Expiry is deliberately not checked.
    ///
    /// # Errors
    /// * `TokenNotFound` - No such verification token
    /// * `TokenAlreadyUsed` - Token was consumed before
    /// * `EmailSend` - Verification email could not be delivered
    async fn resend_verification_email(&self, expired_token: &TokenValue)
        -> Result<(), AuthError>;

    /// Issue a PASSWORD_RESET token and email the reset link.
    ///
    /// # Errors
    /// * `UserNotFound` - No account with this email
    /// * `AccountLocked` - Account may not reset its password
    /// * `EmailSend` - Reset email could not be delivered
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AuthError>;

    /// Consume a PASSWORD_RESET token and replace its owner's password hash.
    ///
    /// # Errors
    /// * `TokenNotFound` - No such verification token
    /// * `TokenAlreadyUsed` - Token was consumed before (including a concurrent consumer)
    /// * `TokenExpired` - Token is past its expiry
    async fn reset_password(
        &self,
        token: &TokenValue,
        new_password: NewPassword,
    ) -> Result<(), AuthError>;

    /// Retrieve an account by its public identifier.
    ///
    /// # Errors
    /// * `UserNotFound` - No account with this public id
    async fn get_account(&self, public_id: &PublicId) -> Result<Account, AuthError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Insert a new account and return it with its assigned storage key.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError>;

    /// Retrieve account by storage key.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AuthError>;

    /// Retrieve account by public identifier.
    async fn find_by_public_id(&self, public_id: &PublicId) -> Result<Option<Account>, AuthError>;

    /// Retrieve account by exact email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Check whether an account with this exact email exists.
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;
}

/// Persistence operations for verification tokens.
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync + 'static {
    /// Persist a freshly issued token.
    async fn save(&self, token: &VerificationToken) -> Result<(), AuthError>;

    /// Retrieve token by its string value.
    async fn find_by_token(&self, token: &TokenValue)
        -> Result<Option<VerificationToken>, AuthError>;

    /// Remove a token.
    ///
    /// # Returns
    /// `false` when no row matched (already removed)
    async fn delete(&self, token: &TokenValue) -> Result<bool, AuthError>;

    /// Atomically mark the token used and apply `effect` to the token's owner.
    ///
    /// The effect is applied only when the token was still unused; both writes
    /// commit together or not at all.
    ///
    /// # Returns
    /// `false` when the token had already been consumed
    async fn consume(
        &self,
        token: &TokenValue,
        used_at: DateTime<Utc>,
        effect: TokenEffect,
    ) -> Result<bool, AuthError>;
}

/// Outbound email delivery.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Render `template_name` with `variables` and deliver it to `to`.
    ///
    /// # Errors
    /// * `InvalidAddress` - Sender or recipient address rejected
    /// * `UnknownTemplate` - No template with this name
    /// * `Transport` - Delivery failed
    async fn send(
        &self,
        to: &str,
        template_name: &str,
        subject: &str,
        variables: &HashMap<String, String>,
    ) -> Result<(), EmailSendError>;
}
