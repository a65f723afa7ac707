//! Nalanda Library Management Server
//!
//! Book catalog, borrowing and admin reports, served over a REST JSON API and
//! a GraphQL endpoint backed by the same services.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod graphql;
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
    pub schema: graphql::LibrarySchema,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = Arc::new(services::Services::new(repository, config.auth.clone()));
        let schema = graphql::build_schema(services.clone());
        Self {
            config: Arc::new(config),
            services,
            schema,
        }
    }
}
