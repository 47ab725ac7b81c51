//! Authentication endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse, UserInfo},
};

use super::{AuthenticatedUser, HOME_PATH};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Path to return to after signing in
    pub next: Option<String>,
}

/// Sign-in landing page
#[derive(Serialize, ToSchema)]
pub struct LoginPage {
    pub message: String,
    pub next: String,
}

/// Only same-site absolute paths are followed after signing in.
///
/// Browsers read a leading `//` or `/\` as the start of another host.
fn return_path(next: Option<&str>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => HOME_PATH.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}

/// Where the sign-in redirect lands
#[utoipa::path(
    get,
    path = "/auth/login",
    tag = "auth",
    params(LoginQuery),
    responses(
        (status = 200, description = "Sign in by posting credentials to this path", body = LoginPage)
    )
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        message: "Please login to see this page.".to_string(),
        next: return_path(query.next.as_deref()),
    })
}

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, expires_in) = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in,
        next: return_path(request.next.as_deref()),
    }))
}

/// Current user and the capabilities they hold
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 302, description = "Not signed in, redirected to sign in")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.auth.me(&claims).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_path_keeps_local_paths_only() {
        assert_eq!(return_path(Some("/api/v1/loans/mine?page=2")), "/api/v1/loans/mine?page=2");
        assert_eq!(return_path(Some("/")), "/");
        assert_eq!(return_path(Some("//evil.example/")), HOME_PATH);
        assert_eq!(return_path(Some("/\\evil.example/")), HOME_PATH);
        assert_eq!(return_path(Some("api/v1/loans")), HOME_PATH);
        assert_eq!(return_path(Some("https://evil.example/")), HOME_PATH);
        assert_eq!(return_path(None), HOME_PATH);
    }
}
