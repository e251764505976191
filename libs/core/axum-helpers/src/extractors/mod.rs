//! Custom extractors for Axum handlers.
//!
//! Rejections render through [`AppError`](crate::errors::AppError) so every
//! failure shares the standard error body.

pub mod id_path;
pub mod principal;
pub mod validated_json;

pub use id_path::IdPath;
pub use principal::{Principal, PRINCIPAL_HEADER};
pub use validated_json::ValidatedJson;
