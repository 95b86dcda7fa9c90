use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{eyre, WrapErr as _};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::account::PgCredentialStore;
use crate::auth::AccountService;

/// Default bcrypt cost factor for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Connection settings for the credential store
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    pub fn from_env() -> color_eyre::Result<Self> {
        Ok(Self {
            host: env_or("DB_HOST", "localhost"),
            port: std::env::var("DB_PORT")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .wrap_err("DB_PORT must be a port number")?
                .unwrap_or(5432),
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", ""),
            database: env_or("DB_NAME", "game_db"),
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Settings for password hashing, token signing, and store call bounds.
///
/// Loaded once at startup and passed into the account service; business
/// logic never reads the environment directly.
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify session tokens. Mandatory: there is
    /// deliberately no development fallback.
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    /// Upper bound on each credential store round-trip
    pub store_timeout: Duration,
}

impl AuthConfig {
    pub fn from_env() -> color_eyre::Result<Self> {
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| eyre!("JWT_SECRET must be set"))?;

        let bcrypt_cost = std::env::var("BCRYPT_COST")
            .ok()
            .map(|v| v.parse())
            .transpose()
            .wrap_err("BCRYPT_COST must be an integer")?
            .unwrap_or(DEFAULT_BCRYPT_COST);

        let store_timeout_ms = std::env::var("STORE_TIMEOUT_MS")
            .ok()
            .map(|v| v.parse())
            .transpose()
            .wrap_err("STORE_TIMEOUT_MS must be a duration in milliseconds")?
            .unwrap_or(5_000);

        Ok(Self {
            jwt_secret,
            bcrypt_cost,
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}

impl AppState {
    pub async fn from_env() -> color_eyre::Result<Self> {
        let db_config = DatabaseConfig::from_env()?;
        let pool = setup_db_pool(&db_config).await?;

        let auth_config = AuthConfig::from_env()?;
        let store = Arc::new(PgCredentialStore::new(pool));

        Ok(Self {
            accounts: AccountService::new(store, auth_config),
        })
    }
}

#[tracing::instrument(skip(config), err)]
pub async fn setup_db_pool(config: &DatabaseConfig) -> color_eyre::Result<PgPool> {
    const MIGRATION_LOCK_ID: i64 = 0xDB_DB_DB_DB_DB_DB_DB;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(config.connect_options())
        .await?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&pool)
        .await?;

    sqlx::migrate!("../migrations").run(&pool).await?;

    let unlocked: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&pool)
        .await?;

    if unlocked {
        tracing::info!("Migration lock unlocked");
    } else {
        tracing::warn!("Failed to unlock migration lock");
    }

    Ok(pool)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
