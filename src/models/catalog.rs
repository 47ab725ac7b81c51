//! Home page summary

use serde::Serialize;
use utoipa::ToSchema;

/// Collection counters shown on the catalog home page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Books with no genre whose name contains "Non-fiction"
    pub num_fictional_books: i64,
    /// Visits by this client before the current one
    pub num_visits: i64,
}
