use std::future::Future;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use color_eyre::eyre::eyre;
use tracing::info;

use crate::account::{CredentialStore, StoreError};
use crate::errors::{
    AccountError, IDENTIFIER_TAKEN, INVALID_CREDENTIALS, INVALID_TOKEN, MISSING_LOGIN_FIELDS,
    MISSING_SIGNUP_FIELDS, PASSWORD_TOO_SHORT,
};
use crate::state::{AppState, AuthConfig};
use crate::token::{self, Claims, TOKEN_TTL_DAYS};

/// Minimum accepted password length at signup
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Orchestrates signup and login over a credential store.
///
/// Stateless between requests: the store round-trips are the only
/// suspension points, and each is bounded by the configured timeout.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    config: AuthConfig,
}

#[derive(Debug)]
pub struct SignupInput {
    pub identifier: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug)]
pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

/// Issued on successful signup or login. Carries only public fields;
/// the password hash never leaves the service.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub identifier: String,
    pub display_name: String,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Register a new account and issue a session token for it.
    pub async fn signup(&self, input: SignupInput) -> Result<IssuedSession, AccountError> {
        if input.identifier.is_empty() || input.password.is_empty() || input.display_name.is_empty()
        {
            return Err(AccountError::Validation(MISSING_SIGNUP_FIELDS));
        }

        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::Validation(PASSWORD_TOO_SHORT));
        }

        // Friendly-path uniqueness check; the store's unique index remains
        // the authority if a concurrent signup races past this.
        let existing = self
            .bounded(self.store.find_by_identifier(&input.identifier))
            .await?;
        if existing.is_some() {
            return Err(AccountError::Conflict(IDENTIFIER_TAKEN));
        }

        let password_hash = bcrypt::hash(&input.password, self.config.bcrypt_cost)
            .map_err(|e| AccountError::Internal(eyre!("Password hashing failed: {e}")))?;

        self.bounded(
            self.store
                .create(&input.identifier, &input.display_name, &password_hash),
        )
        .await?;

        info!("Registered account {}", input.identifier);

        self.issue(&input.identifier, &input.display_name)
    }

    /// Authenticate an existing account and issue a session token for it.
    pub async fn login(&self, input: LoginInput) -> Result<IssuedSession, AccountError> {
        if input.identifier.is_empty() || input.password.is_empty() {
            return Err(AccountError::Validation(MISSING_LOGIN_FIELDS));
        }

        let account = self
            .bounded(self.store.find_by_identifier(&input.identifier))
            .await?
            .ok_or(AccountError::Auth(INVALID_CREDENTIALS))?;

        let password_matches = bcrypt::verify(&input.password, &account.password_hash)
            .map_err(|e| AccountError::Internal(eyre!("Password verification failed: {e}")))?;
        if !password_matches {
            return Err(AccountError::Auth(INVALID_CREDENTIALS));
        }

        info!("Account {} logged in", account.identifier);

        self.issue(&account.identifier, &account.display_name)
    }

    /// Validate a bearer token presented by a client.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AccountError> {
        token::verify(token, &self.config.jwt_secret).map_err(|_| AccountError::Auth(INVALID_TOKEN))
    }

    fn issue(&self, identifier: &str, display_name: &str) -> Result<IssuedSession, AccountError> {
        let token = token::issue(
            identifier,
            display_name,
            &self.config.jwt_secret,
            chrono::Duration::days(TOKEN_TTL_DAYS),
        )
        .map_err(|e| AccountError::Internal(eyre!("Token signing failed: {e}")))?;

        Ok(IssuedSession {
            token,
            identifier: identifier.to_owned(),
            display_name: display_name.to_owned(),
        })
    }

    /// Bound a store round-trip by the configured timeout; a hung store
    /// call surfaces as an internal failure instead of blocking forever.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AccountError> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result.map_err(AccountError::from),
            Err(_) => Err(AccountError::Internal(eyre!(
                "Credential store call timed out"
            ))),
        }
    }
}

/// Extract the authenticated account from a bearer token on the request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identifier: String,
    pub display_name: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AccountError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AccountError::Auth(INVALID_TOKEN))?;

        let claims = state.accounts.verify_token(bearer)?;

        Ok(CurrentUser {
            identifier: claims.sub,
            display_name: claims.display_name,
        })
    }
}
