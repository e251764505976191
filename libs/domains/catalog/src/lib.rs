//! Catalog Domain
//!
//! Products of the retail back office: creation and partial update under
//! reference, uniqueness and placement rules, soft delete, duplication,
//! filtered listings and bulk CSV import.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← One transaction per write, projection of reads
//! └──────┬──────┘
//!        │
//! ┌──────▼───────────────────────────────────────────┐
//! │ invariants · uniqueness · resolver · lifecycle   │  ← Rules
//! │ query · import · projection                      │
//! └──────┬───────────────────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Transactions, search, display names
//! └─────────────┘     (in-memory and Postgres)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     repository::InMemoryProductRepository,
//!     service::ProductService,
//! };
//!
//! let repository = InMemoryProductRepository::new();
//! let service = ProductService::new(repository);
//!
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod import;
pub mod invariants;
pub mod lifecycle;
pub mod models;
pub mod postgres;
pub mod projection;
pub mod query;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod uniqueness;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use import::ImportReport;
pub use lifecycle::ProductStatus;
pub use models::{
    BarcodeSymbology, CreateProduct, DiscountType, ExpiredParams, LowStockParams, Product,
    ProductListParams, ProductType, SellingType, StockParams, TaxType, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use projection::{BarcodeData, ProductPage, ProductView};
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use resolver::{Reference, ReferenceKind};
pub use service::ProductService;
pub use uniqueness::UniqueKey;
