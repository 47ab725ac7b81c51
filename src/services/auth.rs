//! Sign-in and current user

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims, UserInfo},
    repository::Repository,
};

use super::access::AccessPolicy;

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    access: AccessPolicy,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, access: AccessPolicy) -> Self {
        Self {
            repository,
            config,
            access,
        }
    }

    /// Check credentials and issue a token; returns the token and its lifetime in seconds
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, i64)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !user.is_active || !verify_password(&user.password, password)? {
            tracing::debug!("Failed sign-in for {}", username);
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        self.repository.users.touch_last_login(user.id).await?;
        tracing::info!("User {} signed in", user.username);

        let expires_in = self.config.jwt_expiration_hours as i64 * 3600;
        let token = self.create_token(&user, expires_in)?;
        Ok((token, expires_in))
    }

    fn create_token(&self, user: &User, expires_in: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp: now + expires_in,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Profile and capabilities of the signed-in user
    pub async fn me(&self, claims: &UserClaims) -> AppResult<UserInfo> {
        let user = self.repository.users.get_by_id(claims.user_id).await?;
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        let capabilities = self.access.capabilities(user.id).await?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            capabilities,
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies_only_with_the_same_password() {
        let hash = hash_password("1X<ISRUkw+tuK").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "1X<ISRUkw+tuK").unwrap());
        assert!(!verify_password(&hash, "2HJ1vRV0Z&3iD").unwrap());
    }

    #[test]
    fn unparsable_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("plaintext", "plaintext"),
            Err(AppError::Internal(_))
        ));
    }
}
