//! Catalog home page

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{error::AppResult, models::catalog::CatalogSummary};

/// Cookie carrying the visitor's count of earlier visits
pub const VISITS_COOKIE: &str = "num_visits";

fn previous_visits(jar: &CookieJar) -> i64 {
    jar.get(VISITS_COOKIE)
        .and_then(|cookie| cookie.value().parse::<i64>().ok())
        .filter(|visits| *visits >= 0)
        .unwrap_or(0)
}

/// Collection counters and the visitor's visit count
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog summary; sets the num_visits cookie", body = CatalogSummary)
    )
)]
pub async fn home(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<CatalogSummary>)> {
    let num_visits = previous_visits(&jar);
    let summary = state.services.catalog.summary(num_visits).await?;

    let cookie = Cookie::build((VISITS_COOKIE, num_visits.saturating_add(1).to_string()))
        .path("/")
        .http_only(true);

    Ok((jar.add(cookie), Json(summary)))
}
