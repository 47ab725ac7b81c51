//! Business logic services

pub mod access;
pub mod auth;
pub mod catalog;
pub mod loans;
pub mod renewal;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, CatalogConfig},
    repository::{BookInstanceStore, BookStore, CapabilityGrants, LoanLedger, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub renewal: renewal::RenewalService,
}

impl Services {
    /// Create all services backed by the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, catalog_config: CatalogConfig) -> Self {
        let store: Arc<dyn BookInstanceStore> = Arc::new(repository.book_instances.clone());
        let grants: Arc<dyn CapabilityGrants> = Arc::new(repository.users.clone());
        Self::with_collaborators(repository, auth_config, catalog_config, store, grants)
    }

    /// Create all services with explicit renewal and grant collaborators
    pub fn with_collaborators(
        repository: Repository,
        auth_config: AuthConfig,
        catalog_config: CatalogConfig,
        store: Arc<dyn BookInstanceStore>,
        grants: Arc<dyn CapabilityGrants>,
    ) -> Self {
        let access = access::AccessPolicy::new(grants.clone());
        let books: Arc<dyn BookStore> = Arc::new(repository.clone());
        let ledger: Arc<dyn LoanLedger> = Arc::new(repository.book_instances.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config, access.clone()),
            catalog: catalog::CatalogService::new(
                repository,
                books,
                access.clone(),
                catalog_config.page_size,
            ),
            loans: loans::LoansService::new(ledger, access, catalog_config.page_size),
            renewal: renewal::RenewalService::new(store, grants),
        }
    }
}
