use async_trait::async_trait;
use sqlx::postgres::PgPool;
use thiserror::Error;
use tracing::info;

/// Represents one registered account as stored in the credential store
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique login name, chosen by the user at signup (primary key)
    pub identifier: String,
    /// Display name shown to other users, not used for authentication
    pub display_name: String,
    /// One-way bcrypt hash of the password; never logged, never returned to callers
    pub password_hash: String,
}

/// Failures surfaced by the credential store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's unique index rejected the insert. The index is the source
    /// of truth for identifier uniqueness, so a concurrent duplicate signup
    /// that slips past the pre-insert check still surfaces as a conflict.
    #[error("identifier already exists in the store")]
    DuplicateIdentifier,
    #[error("credential store unavailable")]
    Unavailable(#[from] sqlx::Error),
}

/// The seam between the account service and the relational store.
///
/// Both operations perform exactly one round-trip and are never retried
/// here; connectivity failures propagate as [`StoreError::Unavailable`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by its exact identifier. Absence is a normal
    /// outcome, not an error.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new account row.
    async fn create(
        &self,
        identifier: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<(), StoreError>;
}

/// Postgres-backed credential store
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT identifier, display_name, password_hash
            FROM accounts WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn create(
        &self,
        identifier: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (identifier, display_name, password_hash)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(identifier)
        .bind(display_name)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => StoreError::DuplicateIdentifier,
            _ => StoreError::Unavailable(e),
        })?;

        info!("Created account {}", identifier);

        Ok(())
    }
}
