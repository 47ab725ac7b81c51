//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "1.0.0",
        description = "Library catalog REST API: browsing, borrowed copies and loan renewal",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login_page,
        auth::login,
        auth::me,
        // Catalog
        catalog::home,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_genres,
        books::list_languages,
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Loans
        loans::my_loans,
        loans::all_loans,
        loans::renewal_form,
        loans::renew_book_instance,
    ),
    components(
        schemas(
            // Auth
            auth::LoginPage,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::UserInfo,
            crate::models::user::Capability,
            // Catalog
            crate::models::catalog::CatalogSummary,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::BookInput,
            crate::models::book::BookRef,
            crate::models::book::AuthorRef,
            crate::models::book::CopySummary,
            crate::models::book::Genre,
            crate::models::book::Language,
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorInput,
            // Loans
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::Borrower,
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::LoanEntry,
            crate::models::renewal::RenewBookForm,
            crate::models::renewal::RenewalForm,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog home page"),
        (name = "books", description = "Books and reference data"),
        (name = "authors", description = "Authors"),
        (name = "loans", description = "Borrowed copies and renewal")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
