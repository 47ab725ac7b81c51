//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{BookDetails, BookInput, BookSummary, Genre, Language},
        user::Viewer,
        Page, PageQuery,
    },
};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries on this page
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
    pub num_pages: i64,
    /// Whether the list spans more than one page
    pub is_paginated: bool,
}

impl<T> From<Page<T>> for PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    fn from(page: Page<T>) -> Self {
        let num_pages = page.request.num_pages(page.total);
        Self {
            items: page.items,
            total: page.total,
            page: page.request.page,
            per_page: page.request.per_page,
            num_pages,
            is_paginated: num_pages > 1,
        }
    }
}

/// List books ordered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<BookSummary>),
        (status = 404, description = "No such page")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(page.into()))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid book or unknown author, language or genre"),
        (status = 403, description = "Librarians only"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Json(book): Json<BookInput>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    let created = state.services.catalog.create_book(&viewer, book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Path(id): Path<i32>,
    Json(book): Json<BookInput>,
) -> AppResult<Json<BookDetails>> {
    let updated = state.services.catalog.update_book(&viewer, id, book).await?;
    Ok(Json(updated))
}

/// Delete a book without copies
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&viewer, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "books",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// List languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "books",
    responses(
        (status = 200, description = "All languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}
