//! Business logic services

pub mod auth;
pub mod borrows;
pub mod catalog;
pub mod reports;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowService,
    pub reports: reports::ReportService,
    repository: Repository,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowService::new(repository.clone()),
            reports: reports::ReportService::new(repository.clone()),
            repository,
        }
    }

    /// Round trip to the storage engine, for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.count().await?;
        Ok(())
    }
}
