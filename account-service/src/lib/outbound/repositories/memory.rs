use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::account::errors::AuthError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountStatus;
use crate::account::models::NewAccount;
use crate::account::models::PublicId;
use crate::account::ports::AccountRepository;
use crate::account::ports::VerificationTokenRepository;
use crate::account::verification::TokenEffect;
use crate::account::verification::TokenValue;
use crate::account::verification::VerificationToken;

/// Process-local store backing both repository ports.
///
/// Accounts and tokens share one lock, so `consume` marks the token and
/// writes the owner in a single critical section. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    accounts: HashMap<AccountId, Account>,
    tokens: HashMap<TokenValue, VerificationToken>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the status of the account registered under `email`.
    ///
    /// # Returns
    /// `false` when no such account exists
    pub async fn set_status(&self, email: &str, status: AccountStatus) -> bool {
        let mut state = self.state.lock().await;
        match state.accounts.values_mut().find(|a| a.email.as_str() == email) {
            Some(account) => {
                account.status = status;
                account.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Move the expiry of a stored token.
    pub async fn set_token_expiry(&self, token: &TokenValue, expires_at: DateTime<Utc>) -> bool {
        let mut state = self.state.lock().await;
        match state.tokens.get_mut(token) {
            Some(stored) => {
                stored.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError> {
        let mut state = self.state.lock().await;

        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::DuplicateEmail(account.email.to_string()));
        }

        state.next_id += 1;
        let account = account.into_account(AccountId(state.next_id));
        state.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AuthError> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> Result<Option<Account>, AuthError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.public_id == *public_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.email.as_str() == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        let state = self.state.lock().await;
        Ok(state.accounts.values().any(|a| a.email.as_str() == email))
    }
}

#[async_trait]
impl VerificationTokenRepository for InMemoryStore {
    async fn save(&self, token: &VerificationToken) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;

        if !state.accounts.contains_key(&token.account_id) {
            return Err(AuthError::DatabaseError(format!(
                "Token references unknown account {}",
                token.account_id
            )));
        }
        state.tokens.insert(token.token.clone(), token.clone());

        Ok(())
    }

    async fn find_by_token(&self, token: &TokenValue) -> Result<Option<VerificationToken>, AuthError> {
        Ok(self.state.lock().await.tokens.get(token).cloned())
    }

    async fn delete(&self, token: &TokenValue) -> Result<bool, AuthError> {
        Ok(self.state.lock().await.tokens.remove(token).is_some())
    }

    async fn consume(
        &self,
        token: &TokenValue,
        used_at: DateTime<Utc>,
        effect: TokenEffect,
    ) -> Result<bool, AuthError> {
        let mut state = self.state.lock().await;

        let account_id = match state.tokens.get_mut(token) {
            Some(stored) if stored.used_at.is_none() => {
                stored.used_at = Some(used_at);
                stored.account_id
            }
            _ => return Ok(false),
        };

        if let Some(account) = state.accounts.get_mut(&account_id) {
            match effect {
                TokenEffect::ActivateAccount => account.activate(),
                TokenEffect::ReplacePasswordHash(password_hash) => {
                    account.change_password_hash(password_hash)
                }
            }
        }

        Ok(true)
    }
}
