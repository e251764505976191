//! Type-safe error codes for API responses.
//!
//! Every error body carries two identifiers taken from [`ErrorCode`]:
//! - a SCREAMING_SNAKE_CASE string clients branch on (e.g. `"DUPLICATE_KEY"`)
//! - an integer for logs and dashboards (e.g. `1101`)
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::DuplicateKey;
//! assert_eq!(code.as_str(), "DUPLICATE_KEY");
//! assert_eq!(code.code(), 1101);
//! assert_eq!(code.status().as_u16(), 409);
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request errors (1000s)
    /// Request validation failed
    ValidationError,
    /// Path identifier is not a positive integer
    InvalidId,
    /// Request body is not valid JSON for the target type
    InvalidJson,
    /// Requested resource was not found
    NotFound,
    /// Request conflicts with current resource state
    Conflict,
    /// Request body exceeds the accepted size
    PayloadTooLarge,

    // Catalog rule violations (1100s)
    /// sku, slug or item code already in use
    DuplicateKey,
    /// A referenced unit, category, brand, store or warehouse does not exist
    ReferenceNotFound,
    /// Value outside a closed set of allowed values
    InvalidEnum,
    /// Expiry date precedes manufacture date
    InvalidDateRange,
    /// Store is pinned to another warehouse
    StoreWarehouseMismatch,
    /// Requested lifecycle status is not allowed
    InvalidStatus,
    /// Import payload rejected before any row was processed
    ImportRejected,
    /// Product carries no barcode symbology or value
    BarcodeUnavailable,

    // Server errors (5000s)
    /// An unexpected internal server error occurred
    InternalError,
    /// Service is temporarily unavailable
    ServiceUnavailable,
    /// The relational store failed
    DatabaseError,
}

impl ErrorCode {
    /// Identifier for client consumption.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::ReferenceNotFound => "REFERENCE_NOT_FOUND",
            Self::InvalidEnum => "INVALID_ENUM",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::StoreWarehouseMismatch => "STORE_WAREHOUSE_MISMATCH",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::ImportRejected => "IMPORT_REJECTED",
            Self::BarcodeUnavailable => "BARCODE_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Integer code for logging and monitoring.
    ///
    /// - 1000-1099: request errors
    /// - 1100-1199: catalog rule violations
    /// - 5000-5099: server errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidId => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::Conflict => 1005,
            Self::PayloadTooLarge => 1006,

            Self::DuplicateKey => 1101,
            Self::ReferenceNotFound => 1102,
            Self::InvalidEnum => 1103,
            Self::InvalidDateRange => 1104,
            Self::StoreWarehouseMismatch => 1105,
            Self::InvalidStatus => 1106,
            Self::ImportRejected => 1107,
            Self::BarcodeUnavailable => 1108,

            Self::InternalError => 5001,
            Self::ServiceUnavailable => 5002,
            Self::DatabaseError => 5003,
        }
    }

    /// HTTP status the code is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict | Self::DuplicateKey => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ValidationError
            | Self::InvalidId
            | Self::InvalidJson
            | Self::ReferenceNotFound
            | Self::InvalidEnum
            | Self::InvalidDateRange
            | Self::StoreWarehouseMismatch
            | Self::InvalidStatus
            | Self::ImportRejected
            | Self::BarcodeUnavailable => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message used when the caller has nothing more specific to say.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidId => "Invalid identifier",
            Self::InvalidJson => "Invalid JSON body",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::PayloadTooLarge => "Request body is too large",
            Self::DuplicateKey => "Unique key already in use",
            Self::ReferenceNotFound => "Referenced entity not found",
            Self::InvalidEnum => "Value is not one of the allowed values",
            Self::InvalidDateRange => "expiredDate must be after manufacturedDate",
            Self::StoreWarehouseMismatch => "Store and warehouse mismatch",
            Self::InvalidStatus => "Invalid status: must be 'active' or 'inactive'",
            Self::ImportRejected => "Import rejected",
            Self::BarcodeUnavailable => "No barcode data for this product",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "A database error occurred",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 17] = [
        ErrorCode::ValidationError,
        ErrorCode::InvalidId,
        ErrorCode::InvalidJson,
        ErrorCode::NotFound,
        ErrorCode::Conflict,
        ErrorCode::PayloadTooLarge,
        ErrorCode::DuplicateKey,
        ErrorCode::ReferenceNotFound,
        ErrorCode::InvalidEnum,
        ErrorCode::InvalidDateRange,
        ErrorCode::StoreWarehouseMismatch,
        ErrorCode::InvalidStatus,
        ErrorCode::ImportRejected,
        ErrorCode::BarcodeUnavailable,
        ErrorCode::InternalError,
        ErrorCode::ServiceUnavailable,
        ErrorCode::DatabaseError,
    ];

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<i32> = ALL.iter().map(ErrorCode::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn test_serde_matches_as_str() {
        for code in ALL {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::json!(code.as_str()));
        }
    }

    #[test]
    fn test_catalog_rule_statuses() {
        assert_eq!(ErrorCode::DuplicateKey.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ReferenceNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert!(ErrorCode::DatabaseError.is_server_error());
        assert!(!ErrorCode::InvalidEnum.is_server_error());
    }
}
