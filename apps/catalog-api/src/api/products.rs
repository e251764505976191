//! Products API routes

use axum::Router;
use domain_catalog::{PgProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Create products router
pub fn router(state: &AppState) -> Router {
    let repository = PgProductRepository::new(state.db.clone());
    let service = ProductService::with_config(repository, state.config.catalog.clone());
    handlers::router(service)
}
