use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use super::account::database_error;
use crate::account::errors::AuthError;
use crate::account::models::AccountId;
use crate::account::models::AccountStatus;
use crate::account::ports::VerificationTokenRepository;
use crate::account::verification::TokenEffect;
use crate::account::verification::TokenValue;
use crate::account::verification::VerificationToken;

pub struct PostgresVerificationTokenRepository {
    pool: PgPool,
}

impl PostgresVerificationTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VerificationTokenRow {
    token: String,
    account_id: i64,
    token_type: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl TryFrom<VerificationTokenRow> for VerificationToken {
    type Error = AuthError;

    fn try_from(row: VerificationTokenRow) -> Result<Self, Self::Error> {
        Ok(VerificationToken {
            token: TokenValue::parse(&row.token)
                .map_err(|e| AuthError::DatabaseError(format!("Corrupt token row: {}", e)))?,
            account_id: AccountId(row.account_id),
            token_type: row
                .token_type
                .parse()
                .map_err(|e| AuthError::DatabaseError(format!("Corrupt token row: {}", e)))?,
            created_at: row.created_at,
            expires_at: row.expires_at,
            used_at: row.used_at,
        })
    }
}

#[async_trait]
impl VerificationTokenRepository for PostgresVerificationTokenRepository {
    async fn save(&self, token: &VerificationToken) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (token, account_id, token_type, created_at, expires_at, used_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.token.as_str())
        .bind(token.account_id.0)
        .bind(token.token_type.as_str())
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.used_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn find_by_token(&self, token: &TokenValue) -> Result<Option<VerificationToken>, AuthError> {
        let row = sqlx::query_as::<_, VerificationTokenRow>(
            r#"
            SELECT token, account_id, token_type, created_at, expires_at, used_at
            FROM verification_tokens
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(VerificationToken::try_from).transpose()
    }

    async fn delete(&self, token: &TokenValue) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM verification_tokens WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn consume(
        &self,
        token: &TokenValue,
        used_at: DateTime<Utc>,
        effect: TokenEffect,
    ) -> Result<bool, AuthError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // Only the first consumer sees an unused row.
        let owner: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE verification_tokens
            SET used_at = $2
            WHERE token = $1 AND used_at IS NULL
            RETURNING account_id
            "#,
        )
        .bind(token.as_str())
        .bind(used_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let Some(account_id) = owner else {
            tx.rollback().await.map_err(database_error)?;
            return Ok(false);
        };

        match effect {
            TokenEffect::ActivateAccount => {
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET status = $2, updated_at = $3
                    WHERE id = $1 AND status = $4
                    "#,
                )
                .bind(account_id)
                .bind(AccountStatus::Active.as_str())
                .bind(used_at)
                .bind(AccountStatus::Pending.as_str())
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
            }
            TokenEffect::ReplacePasswordHash(password_hash) => {
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET password_hash = $2, updated_at = $3
                    WHERE id = $1
                    "#,
                )
                .bind(account_id)
                .bind(password_hash)
                .bind(used_at)
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
            }
        }

        tx.commit().await.map_err(database_error)?;

        Ok(true)
    }
}
