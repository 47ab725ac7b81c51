//! User model, capabilities and request identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Named permission grants, independent of record ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Capability {
    /// Renew loans, list every borrowed copy and edit catalog records ("librarian")
    #[serde(rename = "can_mark_returned")]
    MarkReturned,
}

impl Capability {
    pub const ALL: [Capability; 1] = [Capability::MarkReturned];

    /// Codename as stored in the permission tables
    pub fn codename(&self) -> &'static str {
        match self {
            Capability::MarkReturned => "can_mark_returned",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.codename())
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

/// Current user as returned by `/auth/me`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub capabilities: Vec<Capability>,
}

/// Sign-in request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Return path handed out by the sign-in redirect
    #[serde(default)]
    pub next: Option<String>,
}

/// Sign-in response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Where the client should go next (the `next` parameter, or the home page)
    pub next: String,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// Who is making the request.
///
/// Built for every request; an absent or unusable token gives an anonymous
/// viewer rather than a rejection so that each operation decides what to do
/// with anonymous callers.
#[derive(Debug, Clone)]
pub struct Viewer {
    claims: Option<UserClaims>,
    /// Path and query of the request, used as the sign-in return path
    requested_path: String,
}

impl Viewer {
    pub fn anonymous(requested_path: impl Into<String>) -> Self {
        Self {
            claims: None,
            requested_path: requested_path.into(),
        }
    }

    pub fn authenticated(claims: UserClaims, requested_path: impl Into<String>) -> Self {
        Self {
            claims: Some(claims),
            requested_path: requested_path.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    pub fn claims(&self) -> Option<&UserClaims> {
        self.claims.as_ref()
    }

    pub fn requested_path(&self) -> &str {
        &self.requested_path
    }

    /// Claims of the signed-in user, or a redirect to sign in
    pub fn require_authenticated(&self) -> AppResult<&UserClaims> {
        self.claims.as_ref().ok_or_else(|| AppError::LoginRequired {
            next: self.requested_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset: i64) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 7,
            exp: now + exp_offset,
            iat: now,
        }
    }

    #[test]
    fn token_round_trips_with_the_same_secret() {
        let claims = claims(3600);
        let token = claims.create_token("secret").unwrap();

        assert_eq!(UserClaims::from_token(&token, "secret").unwrap(), claims);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = claims(-3600).create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn anonymous_viewer_is_sent_to_sign_in_with_return_path() {
        let viewer = Viewer::anonymous("/api/v1/loans/mine");

        assert!(!viewer.is_authenticated());
        match viewer.require_authenticated() {
            Err(AppError::LoginRequired { next }) => assert_eq!(next, "/api/v1/loans/mine"),
            other => panic!("expected LoginRequired, got {:?}", other),
        }
    }

    #[test]
    fn capability_serializes_as_codename() {
        assert_eq!(
            serde_json::to_string(&Capability::MarkReturned).unwrap(),
            "\"can_mark_returned\""
        );
    }
}
