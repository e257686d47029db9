use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::account::email::EmailContext;
use crate::account::email::PasswordResetEmailContext;
use crate::account::email::VerifyEmailContext;
use crate::account::errors::AuthError;
use crate::account::models::Account;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::LoginOutcome;
use crate::account::models::NewAccount;
use crate::account::models::NewPassword;
use crate::account::models::PublicId;
use crate::account::models::SignupCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AuthServicePort;
use crate::account::ports::EmailSender;
use crate::account::ports::VerificationTokenRepository;
use crate::account::verification::TokenEffect;
use crate::account::verification::TokenType;
use crate::account::verification::TokenValue;
use crate::account::verification::VerificationToken;

/// Domain service implementation for authentication operations.
///
/// Orchestrates the account store, the verification token store, the email
/// collaborator and the shared `Authenticator`.
pub struct AuthService<AR, TR, ES>
where
    AR: AccountRepository,
    TR: VerificationTokenRepository,
    ES: EmailSender,
{
    accounts: Arc<AR>,
    tokens: Arc<TR>,
    email_sender: Arc<ES>,
    authenticator: Arc<Authenticator>,
    frontend_base_url: String,
}

impl<AR, TR, ES> AuthService<AR, TR, ES>
where
    AR: AccountRepository,
    TR: VerificationTokenRepository,
    ES: EmailSender,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `accounts` - Account persistence implementation
    /// * `tokens` - Verification token persistence implementation
    /// * `email_sender` - Outbound email implementation
    /// * `authenticator` - Password hashing and access token issuing
    /// * `frontend_base_url` - Base of the links embedded in emails
    pub fn new(
        accounts: Arc<AR>,
        tokens: Arc<TR>,
        email_sender: Arc<ES>,
        authenticator: Arc<Authenticator>,
        frontend_base_url: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            email_sender,
            authenticator,
            frontend_base_url: frontend_base_url.into(),
        }
    }

    /// Make sure an active administrator with `email` exists.
    ///
    /// # Returns
    /// The created account, or `None` when the email was already registered
    pub async fn ensure_admin(
        &self,
        name: DisplayName,
        email: EmailAddress,
        password: &str,
    ) -> Result<Option<Account>, AuthError> {
        if self.accounts.exists_by_email(email.as_str()).await? {
            return Ok(None);
        }

        let password_hash = self.hash_password(password)?;
        let admin = self
            .accounts
            .create(NewAccount::admin(name, email, password_hash))
            .await?;

        tracing::info!(public_id = %admin.public_id, email = %admin.email, "Administrator account created");
        Ok(Some(admin))
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.authenticator
            .hash_password(password)
            .map_err(|e| AuthError::Unknown(format!("Password hashing failed: {}", e)))
    }

    /// Look up a token of the expected type and check it can still be consumed.
    async fn resolve_usable_token(
        &self,
        token: &TokenValue,
        expected: TokenType,
    ) -> Result<VerificationToken, AuthError> {
        let found = self
            .tokens
            .find_by_token(token)
            .await?
            .filter(|t| t.token_type == expected)
            .ok_or(AuthError::TokenNotFound)?;

        found.ensure_usable(Utc::now())?;
        Ok(found)
    }

    async fn token_owner(&self, token: &VerificationToken) -> Result<Account, AuthError> {
        self.accounts
            .find_by_id(token.account_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(token.account_id.to_string()))
    }

    async fn consume(&self, token: &VerificationToken, effect: TokenEffect) -> Result<(), AuthError> {
        if self.tokens.consume(&token.token, Utc::now(), effect).await? {
            Ok(())
        } else {
            // Lost the race against a concurrent consumer.
            Err(AuthError::TokenAlreadyUsed)
        }
    }

    async fn send_email<C>(&self, to: &EmailAddress, context: &C) -> Result<(), AuthError>
    where
        C: EmailContext + Sync,
    {
        self.email_sender
            .send(
                to.as_str(),
                context.template_name(),
                context.subject(),
                &context.variables(),
            )
            .await
            .map_err(|e| {
                tracing::error!(to = %to, subject = context.subject(), error = %e, "Failed to send email");
                AuthError::from(e)
            })
    }

    async fn send_verification_email(
        &self,
        account: &Account,
        token: &VerificationToken,
    ) -> Result<(), AuthError> {
        let context = VerifyEmailContext {
            name: account.name.as_str(),
            token: &token.token,
            base_url: &self.frontend_base_url,
        };
        self.send_email(&account.email, &context).await
    }
}

#[async_trait]
impl<AR, TR, ES> AuthServicePort for AuthService<AR, TR, ES>
where
    AR: AccountRepository,
    TR: VerificationTokenRepository,
    ES: EmailSender,
{
    async fn signup(&self, command: SignupCommand) -> Result<(), AuthError> {
        if self.accounts.exists_by_email(command.email.as_str()).await? {
            tracing::warn!(email = %command.email, "Signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password.as_str())?;
        let account = self
            .accounts
            .create(NewAccount::pending(
                command.name,
                command.email,
                password_hash,
                command.phone_number,
            ))
            .await?;

        let token = VerificationToken::issue(account.id, TokenType::VerifyEmail, Utc::now());
        self.tokens.save(&token).await?;

        tracing::info!(public_id = %account.public_id, "Account registered, verification pending");

        self.send_verification_email(&account, &token).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            tracing::warn!(email = %email, "Login failed: unknown email");
            return Err(AuthError::BadCredentials);
        };

        self.authenticator
            .verify_password(password, &account.password_hash)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(email = %email, "Login failed: password mismatch");
                    AuthError::BadCredentials
                }
                other => AuthError::Unknown(format!("Password verification failed: {}", other)),
            })?;

        if account.status.is_locked() {
            tracing::warn!(email = %email, status = %account.status, "Login failed: account locked");
            return Err(AuthError::AccountLocked);
        }
        if !account.status.is_enabled() {
            tracing::warn!(email = %email, "Login failed: email not verified");
            return Err(AuthError::AccountDisabled);
        }

        let access_token = self
            .authenticator
            .issue_token(
                &account.public_id.to_string(),
                account.email.as_str(),
                account.role.authority(),
            )
            .map_err(|e| AuthError::Unknown(format!("Token generation failed: {}", e)))?;

        Ok(LoginOutcome {
            access_token,
            name: account.name.to_string(),
            email: account.email.to_string(),
        })
    }

    async fn verify_email(&self, token: &TokenValue) -> Result<(), AuthError> {
        let found = self
            .resolve_usable_token(token, TokenType::VerifyEmail)
            .await?;
        let owner = self.token_owner(&found).await?;

        self.consume(&found, TokenEffect::ActivateAccount).await?;

        tracing::info!(public_id = %owner.public_id, "Email verified");
        Ok(())
    }

    async fn resend_verification_email(
        &self,
        expired_token: &TokenValue,
    ) -> Result<(), AuthError> {
        let found = self
            .tokens
            .find_by_token(expired_token)
            .await?
            .filter(|t| t.token_type == TokenType::VerifyEmail)
            .ok_or(AuthError::TokenNotFound)?;

        if found.is_used() {
            return Err(AuthError::TokenAlreadyUsed);
        }

        let owner = self.token_owner(&found).await?;

        if !self.tokens.delete(&found.token).await? {
            // Replaced by a concurrent resend.
            return Err(AuthError::TokenNotFound);
        }

        let replacement = VerificationToken::issue(owner.id, TokenType::VerifyEmail, Utc::now());
        self.tokens.save(&replacement).await?;

        tracing::info!(public_id = %owner.public_id, "Verification token reissued");

        self.send_verification_email(&owner, &replacement).await
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AuthError> {
        let account = self
            .accounts
            .find_by_email(email.as_str())
            .await?
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;

        if !account.status.can_reset_password() {
            tracing::warn!(email = %email, status = %account.status, "Password reset refused: account locked");
            return Err(AuthError::AccountLocked);
        }

        let token = VerificationToken::issue(account.id, TokenType::PasswordReset, Utc::now());
        self.tokens.save(&token).await?;

        let context = PasswordResetEmailContext {
            name: account.name.as_str(),
            token: &token.token,
            base_url: &self.frontend_base_url,
        };
        self.send_email(&account.email, &context).await
    }

    async fn reset_password(
        &self,
        token: &TokenValue,
        new_password: NewPassword,
    ) -> Result<(), AuthError> {
        let found = self
            .resolve_usable_token(token, TokenType::PasswordReset)
            .await?;
        let owner = self.token_owner(&found).await?;
        let password_hash = self.hash_password(new_password.as_str())?;

        self.consume(&found, TokenEffect::ReplacePasswordHash(password_hash)).await?;

        tracing::info!(public_id = %owner.public_id, "Password reset");
        Ok(())
    }

    async fn get_account(&self, public_id: &PublicId) -> Result<Account, AuthError> {
        self.accounts
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(public_id.to_string()))
    }
}
