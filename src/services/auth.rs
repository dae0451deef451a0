//! Authentication service: registration, login and bearer tokens

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, User, UserClaims},
    repository::Repository,
    validation::FieldErrors,
};

const INVALID_CREDENTIALS: &str = "These credentials do not match our records.";
const EMAIL_TAKEN: &str = "The email has already been taken.";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create an account and log it in straight away
    pub async fn register(&self, request: RegisterRequest) -> AppResult<(User, String)> {
        let request = request.normalized();
        let mut errors = FieldErrors::new();
        if let Err(e) = request.validate() {
            errors.merge_validator(&e, &["name", "email", "password"]);
        }
        if !errors.contains("email") && self.repository.users_email_exists(&request.email).await? {
            errors.add("email", EMAIL_TAKEN);
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let hash = hash_password(&request.password)?;
        let user = self
            .repository
            .users_create(&request.name, &request.email, &hash)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                AppError::Database(ref db) if is_unique_violation(db) => {
                    AppError::Validation(FieldErrors::single("email", EMAIL_TAKEN))
                }
                other => other,
            })?;

        tracing::info!("User {} registered", user.id);
        let token = self.issue_token(&user).await?;
        Ok((user, token))
    }

    /// Check credentials and return a fresh bearer token
    pub async fn login(&self, request: LoginRequest) -> AppResult<(User, String)> {
        if let Err(e) = request.validate() {
            let mut errors = FieldErrors::new();
            errors.merge_validator(&e, &["email", "password"]);
            return Err(AppError::Validation(errors));
        }

        let user = self
            .repository
            .users_get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user.password, &request.password)? {
            tracing::debug!("Failed login for user {}", user.id);
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let purged = self.repository.tokens_purge_expired(user.id).await?;
        if purged > 0 {
            tracing::debug!("Purged {} expired tokens for user {}", purged, user.id);
        }

        let token = self.issue_token(&user).await?;
        Ok((user, token))
    }

    /// Validate a bearer token and return its claims.
    ///
    /// The signature and expiry are checked first, then the token id must
    /// still be on record (logout removes it).
    pub async fn authenticate(&self, token: &str) -> AppResult<UserClaims> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if !self.repository.tokens_touch(claims.jti, claims.user_id).await? {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }

        Ok(claims)
    }

    /// Revoke the token the request was made with
    pub async fn logout(&self, claims: &UserClaims) -> AppResult<()> {
        self.repository.tokens_delete(claims.jti).await?;
        tracing::debug!("User {} logged out", claims.user_id);
        Ok(())
    }

    pub async fn current_user(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users_get_by_id(claims.user_id).await
    }

    async fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.token_expiration_hours as i64);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            jti: Uuid::new_v4(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        self.repository
            .tokens_create(user.id, claims.jti, expires_at)
            .await?;

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
