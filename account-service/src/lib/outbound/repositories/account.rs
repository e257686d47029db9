use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::NewAccount;
use crate::account::models::PhoneNumber;
use crate::account::models::PublicId;
use crate::account::ports::AccountRepository;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    public_id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone_number: Option<String>,
    status: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AuthError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let corrupt = |e: String| AuthError::DatabaseError(format!("Corrupt account row {}: {}", row.id, e));

        Ok(Account {
            id: AccountId(row.id),
            public_id: PublicId(row.public_id),
            name: DisplayName::new(row.name.clone()).map_err(|e| corrupt(e.to_string()))?,
            email: EmailAddress::new(row.email.clone()).map_err(|e| corrupt(e.to_string()))?,
            password_hash: row.password_hash.clone(),
            phone_number: PhoneNumber::optional(row.phone_number.clone())
                .map_err(|e| corrupt(e.to_string()))?,
            status: row.status.parse().map_err(corrupt)?,
            role: row.role.parse().map_err(corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn database_error(e: sqlx::Error) -> AuthError {
    AuthError::DatabaseError(e.to_string())
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (public_id, name, email, password_hash, phone_number, status, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
            "#,
        )
        .bind(account.public_id.0)
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.phone_number.as_ref().map(|p| p.as_str()))
        .bind(account.status.as_str())
        .bind(account.role.as_str())
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("accounts_email_key") {
                    return AuthError::DuplicateEmail(account.email.to_string());
                }
            }
            database_error(e)
        })?;

        Ok(account.into_account(AccountId(id)))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, public_id, name, email, password_hash, phone_number, status, role, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, public_id, name, email, password_hash, phone_number, status, role, created_at, updated_at
            FROM accounts
            WHERE public_id = $1
            "#,
        )
        .bind(public_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, public_id, name, email, password_hash, phone_number, status, role, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }
}
