use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use serde_json::json;
use thiserror::Error;

use crate::resolver::ReferenceKind;
use crate::uniqueness::UniqueKey;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Unknown id, or a product in the DELETED state.
    #[error("Product {0} not found")]
    NotFound(i64),

    #[error("{} already in use", .field.label())]
    DuplicateKey { field: UniqueKey, value: String },

    #[error("{} not found", .kind.label())]
    ReferenceNotFound { kind: ReferenceKind, id: i64 },

    #[error("Invalid {field}: must be one of {}", .allowed.join(", "))]
    InvalidEnum {
        field: &'static str,
        allowed: Vec<String>,
    },

    #[error("expiredDate must be after manufacturedDate")]
    InvalidDateRange,

    #[error("Store and warehouse mismatch")]
    StoreWarehouseMismatch,

    #[error("Invalid status: must be 'active' or 'inactive'")]
    InvalidStatus(String),

    #[error("{0}")]
    Validation(String),

    /// The import payload is unusable as a whole.
    #[error("{0}")]
    Configuration(String),

    #[error("Payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("No barcode data for this product")]
    BarcodeUnavailable(i64),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<sea_orm::DbErr> for ProductError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProductError::Database(err.to_string())
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        match err {
            ProductError::NotFound(_) => AppError::NotFound(message),
            ProductError::DuplicateKey { field, value } => {
                AppError::rule(ErrorCode::DuplicateKey, message)
                    .with_details(json!({ "field": field.as_str(), "value": value }))
            }
            ProductError::ReferenceNotFound { kind, id } => {
                AppError::rule(ErrorCode::ReferenceNotFound, message)
                    .with_details(json!({ "kind": kind.as_str(), "id": id }))
            }
            ProductError::InvalidEnum { field, allowed } => {
                AppError::rule(ErrorCode::InvalidEnum, message)
                    .with_details(json!({ "field": field, "allowed": allowed }))
            }
            ProductError::InvalidDateRange => AppError::rule(ErrorCode::InvalidDateRange, message),
            ProductError::StoreWarehouseMismatch => {
                AppError::rule(ErrorCode::StoreWarehouseMismatch, message)
            }
            ProductError::InvalidStatus(value) => AppError::rule(ErrorCode::InvalidStatus, message)
                .with_details(json!({ "value": value, "allowed": ["active", "inactive"] })),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Configuration(msg) => AppError::rule(ErrorCode::ImportRejected, msg),
            ProductError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(message),
            ProductError::BarcodeUnavailable(id) => {
                AppError::rule(ErrorCode::BarcodeUnavailable, message)
                    .with_details(json!({ "id": id }))
            }
            ProductError::Database(detail) => {
                tracing::error!(error = %detail, "Catalog database failure");
                AppError::rule(
                    ErrorCode::DatabaseError,
                    ErrorCode::DatabaseError.default_message(),
                )
            }
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
