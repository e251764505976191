//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! ## Modules
//!
//! - **[`errors`]**: `AppError`, the `ErrorCode` registry and OpenAPI response docs
//! - **[`extractors`]**: integer id path, validated JSON, forwarded principal
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`audit`]**: audit events for mutations

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod server;

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{IdPath, PRINCIPAL_HEADER, Principal, ValidatedJson};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
