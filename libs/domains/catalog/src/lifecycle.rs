//! Product status state machine.
//!
//! ```text
//!   create ──► active ◄──► inactive
//!                │            │
//!                └──► DELETED ◄┘   (terminal)
//! ```

use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

/// Product lifecycle status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(ascii_case_insensitive)]
pub enum ProductStatus {
    /// Visible and sellable
    #[default]
    #[serde(rename = "active")]
    #[strum(serialize = "active")]
    #[sea_orm(string_value = "active")]
    Active,
    /// Visible but disabled
    #[serde(rename = "inactive")]
    #[strum(serialize = "inactive")]
    #[sea_orm(string_value = "inactive")]
    Inactive,
    /// Soft-deleted, never returned by reads
    #[serde(rename = "DELETED")]
    #[strum(serialize = "DELETED")]
    #[sea_orm(string_value = "DELETED")]
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: ProductStatus,
    pub to: ProductStatus,
}

impl ProductStatus {
    pub fn is_visible(self) -> bool {
        !matches!(self, ProductStatus::Deleted)
    }

    /// Next status after a transition request. Nothing leaves DELETED.
    pub fn transition(self, to: ProductStatus) -> Result<ProductStatus, IllegalTransition> {
        match self {
            ProductStatus::Deleted => Err(IllegalTransition { from: self, to }),
            ProductStatus::Active | ProductStatus::Inactive => Ok(to),
        }
    }

    /// Parse a caller-requested status. Only `active` and `inactive` are
    /// accepted, in any letter case.
    pub fn parse_requested(raw: &str) -> ProductResult<ProductStatus> {
        match raw.trim().parse::<ProductStatus>() {
            Ok(status) if status.is_visible() => Ok(status),
            _ => Err(ProductError::InvalidStatus(raw.to_string())),
        }
    }
}

/// Hide soft-deleted rows behind the same error as a missing id.
pub fn require_visible(id: i64, product: Option<Product>) -> ProductResult<Product> {
    match product {
        Some(product) if product.status.is_visible() => Ok(product),
        _ => Err(ProductError::NotFound(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveEnum;

    #[test]
    fn test_stored_values() {
        assert_eq!(ProductStatus::Deleted.to_value(), "DELETED");
        assert_eq!(
            ProductStatus::try_from_value(&"inactive".to_string()).unwrap(),
            ProductStatus::Inactive
        );
        assert!(ProductStatus::try_from_value(&"archived".to_string()).is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(ProductStatus::Active.to_string(), "active");
        assert_eq!(ProductStatus::Deleted.to_string(), "DELETED");
        assert_eq!(
            serde_json::to_value(ProductStatus::Inactive).unwrap(),
            serde_json::json!("inactive")
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ACTIVE".parse::<ProductStatus>().unwrap(), ProductStatus::Active);
        assert_eq!("deleted".parse::<ProductStatus>().unwrap(), ProductStatus::Deleted);
    }

    #[test]
    fn test_transitions() {
        assert_eq!(
            ProductStatus::Active.transition(ProductStatus::Inactive),
            Ok(ProductStatus::Inactive)
        );
        assert_eq!(
            ProductStatus::Inactive.transition(ProductStatus::Deleted),
            Ok(ProductStatus::Deleted)
        );
        assert!(ProductStatus::Deleted.transition(ProductStatus::Active).is_err());
    }

    #[test]
    fn test_parse_requested() {
        assert_eq!(
            ProductStatus::parse_requested(" Inactive ").unwrap(),
            ProductStatus::Inactive
        );
        assert!(matches!(
            ProductStatus::parse_requested("DELETED"),
            Err(ProductError::InvalidStatus(v)) if v == "DELETED"
        ));
        assert!(matches!(
            ProductStatus::parse_requested("archived"),
            Err(ProductError::InvalidStatus(_))
        ));
    }
}
