/// Registration, credential authentication and token pair issuance
///
/// Holds no per-request state. Failures come back as `AppError::Auth`
/// with one of the `AuthError` kinds, so the HTTP layer can map them
/// uniformly.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::auth::claims::{TokenKind, TokenPair};
use crate::auth::jwt::TokenCodec;
use crate::auth::password::{validate_password_strength, CredentialHasher};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::users::{NewUser, User, UserProfile, UserRepository};
use crate::validators::{is_valid_email, is_valid_name, normalize_email};

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    codec: TokenCodec,
    hasher: CredentialHasher,
    access_ttl_minutes: i64,
    refresh_ttl_minutes: i64,
    /// Verified against when the email is unknown, so a miss costs as much as a hit
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, codec: TokenCodec, settings: &AuthSettings) -> Self {
        Self {
            users,
            codec,
            hasher: CredentialHasher::new(settings.hash_cost),
            access_ttl_minutes: settings.access_token_expire_minutes,
            refresh_ttl_minutes: settings.refresh_token_expire_minutes,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Create an account
    ///
    /// # Errors
    /// - Validation errors for email, password or name
    /// - `DuplicateEmail` if the address is already registered
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AppError> {
        let email = is_valid_email(&request.email)?;
        let full_name = request
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(is_valid_name)
            .transpose()?;
        validate_password_strength(&request.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail.into());
        }

        let hasher = self.hasher;
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                full_name,
            })
            .await
            .map_err(|e| match e {
                // lost a race with a concurrent registration
                AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                    AppError::Auth(AuthError::DuplicateEmail)
                }
                other => other,
            })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user.into())
    }

    /// Check an email/password pair
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller. The active flag is only consulted once the password matched.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = match self.users.find_by_email(&normalize_email(email)).await? {
            Some(user) => user,
            None => {
                let dummy_hash = self.dummy_hash().await?.to_string();
                self.verify_password(password, dummy_hash).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.verify_password(password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            return Err(AuthError::InactiveAccount.into());
        }

        Ok(user)
    }

    async fn verify_password(&self, password: &str, stored_hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await?)
    }

    async fn dummy_hash(&self) -> Result<&str, AppError> {
        let hasher = self.hasher;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || hasher.hash("unused-dummy-password")).await?
            })
            .await?;
        Ok(hash.as_str())
    }

    /// Mint a fresh access/refresh pair for `user_id`
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, AppError> {
        let subject = user_id.to_string();
        let access_token = self
            .codec
            .encode(&subject, TokenKind::Access, self.access_ttl_minutes)?;
        let refresh_token = self
            .codec
            .encode(&subject, TokenKind::Refresh, self.refresh_ttl_minutes)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl_minutes * 60,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AppError> {
        let user = self.authenticate(&request.email, &request.password).await?;
        let pair = self.issue_pair(user.id)?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented token is not consumed and stays valid until it expires.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.codec.decode(refresh_token).map_err(AuthError::from)?;
        claims.expect_kind(TokenKind::Refresh)?;
        let user_id = claims.user_id()?;

        tracing::info!(user_id = user_id, "Token refreshed");
        self.issue_pair(user_id)
    }
}
