//! Loan listings and renewal endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::LoanEntry,
        renewal::RenewBookForm,
        user::Viewer,
        PageQuery,
    },
    services::renewal::{RenewalOutcome, RenewalRequest},
};

use super::{books::PaginatedResponse, ALL_BORROWED_PATH};

/// Copies borrowed by the signed-in user
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan to the caller", body = PaginatedResponse<LoanEntry>),
        (status = 302, description = "Not signed in, redirected to sign in"),
        (status = 404, description = "No such page")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanEntry>>> {
    let page = state.services.loans.my_loans(&viewer, &query, state.clock.today()).await?;
    Ok(Json(page.into()))
}

/// Every borrowed copy (librarians)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All copies on loan", body = PaginatedResponse<LoanEntry>),
        (status = 302, description = "Not signed in, redirected to sign in"),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "No such page")
    )
)]
pub async fn all_loans(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanEntry>>> {
    let page = state.services.loans.all_loans(&viewer, &query, state.clock.today()).await?;
    Ok(Json(page.into()))
}

/// Copy identifiers that are not UUIDs cannot name any copy
fn parse_book_instance_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id)
        .map_err(|_| AppError::NotFound(format!("Book instance with id {} not found", id)))
}

fn renewal_response(outcome: RenewalOutcome) -> Response {
    match outcome {
        RenewalOutcome::Displayed(form) => (StatusCode::OK, Json(form)).into_response(),
        RenewalOutcome::Renewed(_) => {
            (StatusCode::FOUND, [(LOCATION, ALL_BORROWED_PATH)]).into_response()
        }
        RenewalOutcome::Invalid(form) => (StatusCode::BAD_REQUEST, Json(form)).into_response(),
    }
}

/// Renewal form with the proposed due date
#[utoipa::path(
    get,
    path = "/book-instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book instance UUID")
    ),
    responses(
        (status = 200, description = "Renewal form proposing today + 3 weeks", body = RenewalForm),
        (status = 302, description = "Not signed in, redirected to sign in"),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_book_instance_id(&id)?;
    let outcome = state
        .services
        .renewal
        .renew(&viewer, id, RenewalRequest::Display, state.clock.today())
        .await?;

    Ok(renewal_response(outcome))
}

/// Renew a loan to the submitted date
#[utoipa::path(
    post,
    path = "/book-instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book instance UUID")
    ),
    request_body = RenewBookForm,
    responses(
        (status = 302, description = "Renewed, redirected to the borrowed copies list"),
        (status = 400, description = "Date refused; the form with its errors", body = RenewalForm),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book_instance(
    State(state): State<crate::AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
    payload: Result<Json<RenewBookForm>, JsonRejection>,
) -> AppResult<Response> {
    let id = parse_book_instance_id(&id)?;

    // An unreadable body is bound like an empty form
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable renewal form: {}", rejection.body_text());
            RenewBookForm::default()
        }
    };

    let outcome = state
        .services
        .renewal
        .renew(&viewer, id, RenewalRequest::Submit(form), state.clock.today())
        .await?;

    Ok(renewal_response(outcome))
}
