//! Users and permission grants repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Capability, User},
};

use super::CapabilityGrants;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, first_name, last_name, email,
                   is_active, is_superuser, date_joined
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (case sensitive, like the login form)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, first_name, last_name, email,
                   is_active, is_superuser, date_joined
            FROM users WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Record a successful sign-in
    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CapabilityGrants for UsersRepository {
    /// Active superusers hold every capability; other active users need a
    /// direct grant or a grant through one of their groups.
    async fn has_capability(&self, user_id: i32, capability: Capability) -> AppResult<bool> {
        let granted: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT u.is_active AND (
                u.is_superuser
                OR EXISTS (
                    SELECT 1 FROM user_permissions up
                    WHERE up.user_id = u.id AND up.codename = $2
                )
                OR EXISTS (
                    SELECT 1 FROM user_groups ug
                    JOIN group_permissions gp ON gp.group_id = ug.group_id
                    WHERE ug.user_id = u.id AND gp.codename = $2
                )
            )
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .bind(capability.codename())
        .fetch_optional(&self.pool)
        .await?;

        Ok(granted.unwrap_or(false))
    }
}
