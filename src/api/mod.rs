//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{header::AUTHORIZATION, request::Parts},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::user::{UserClaims, Viewer},
    AppState,
};

/// Every endpoint lives under this prefix
pub const API_PREFIX: &str = "/api/v1";

/// Where anonymous callers are sent to sign in
pub const LOGIN_PATH: &str = "/api/v1/auth/login";

/// Catalog home, the default destination after signing in
pub const HOME_PATH: &str = "/api/v1/catalog";

/// List of every borrowed copy, where a successful renewal leads
pub const ALL_BORROWED_PATH: &str = "/api/v1/loans";

/// Source of "today" for date rules such as loan renewal
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// The server's local calendar date
    #[default]
    Local,
    /// Always the given date
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Identity of the caller; never rejects.
#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Nested routers strip the prefix from `parts.uri`
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let requested_path = uri
            .path_and_query()
            .map(|path| path.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        let claims = bearer_token(parts).and_then(|token| {
            UserClaims::from_token(token, &state.config.auth.jwt_secret)
                .map_err(|e| tracing::debug!("Ignoring unusable token: {}", e))
                .ok()
        });

        Ok(match claims {
            Some(claims) => Viewer::authenticated(claims, requested_path),
            None => Viewer::anonymous(requested_path),
        })
    }
}

/// Extractor for a signed-in user; anonymous callers are sent to sign in
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        let claims = viewer.require_authenticated()?.clone();

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/me", get(auth::me))
        // Catalog
        .route("/catalog", get(catalog::home))
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/genres", get(books::list_genres))
        .route("/languages", get(books::list_languages))
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Loans
        .route("/loans", get(loans::all_loans))
        .route("/loans/mine", get(loans::my_loans))
        .route(
            "/book-instances/:id/renew",
            get(loans::renewal_form).post(loans::renew_book_instance),
        )
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
