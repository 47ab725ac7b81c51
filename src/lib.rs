//! Local Library Catalog
//!
//! A REST JSON server for a small library catalog: visitors browse books and
//! authors, borrowers see their loans, and librarians renew loans and maintain
//! author and book records.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub clock: api::Clock,
}
