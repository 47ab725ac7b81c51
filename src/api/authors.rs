//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, AuthorInput},
        user::Viewer,
        PageQuery,
    },
};

use super::books::PaginatedResponse;

/// List authors ordered by last name, then first name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "List of authors", body = PaginatedResponse<Author>),
        (status = 404, description = "No such page")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    let page = state.services.catalog.list_authors(&query).await?;
    Ok(Json(page.into()))
}

/// Get an author and their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid author"),
        (status = 403, description = "Librarians only")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Json(author): Json<AuthorInput>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let created = state.services.catalog.create_author(&viewer, author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid author"),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Path(id): Path<i32>,
    Json(author): Json<AuthorInput>,
) -> AppResult<Json<Author>> {
    let updated = state.services.catalog.update_author(&viewer, id, author).await?;
    Ok(Json(updated))
}

/// Delete an author; their books are kept
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(&viewer, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
