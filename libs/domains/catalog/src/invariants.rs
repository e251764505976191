//! Field and cross-field rules shared by create, update and import.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::Iterable;

use crate::error::{ProductError, ProductResult};
use crate::lifecycle::ProductStatus;
use crate::models::{
    BarcodeSymbology, CreateProduct, DiscountType, NewProduct, ProductPatch, ProductType,
    SellingType, TaxType, UpdateProduct,
};
use crate::resolver::Reference;

/// Case-insensitive match against the closed set of `E`.
pub fn parse_enum<E>(field: &'static str, raw: &str) -> ProductResult<E>
where
    E: FromStr + Iterable + Display,
{
    raw.trim().parse::<E>().map_err(|_| ProductError::InvalidEnum {
        field,
        allowed: E::iter().map(|v| v.to_string()).collect(),
    })
}

/// Like [`parse_enum`], treating absent or blank input as "not given".
pub fn parse_optional_enum<E>(field: &'static str, raw: Option<&str>) -> ProductResult<Option<E>>
where
    E: FromStr + Iterable + Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_enum(field, value).map(Some),
        None => Ok(None),
    }
}

/// Equal dates are accepted.
pub fn check_dates(manufactured: Option<NaiveDate>, expired: Option<NaiveDate>) -> ProductResult<()> {
    match (manufactured, expired) {
        (Some(made), Some(expires)) if expires < made => Err(ProductError::InvalidDateRange),
        _ => Ok(()),
    }
}

/// A store pinned to a warehouse only takes products of that warehouse.
pub fn check_placement(store: &Reference, warehouse: &Reference) -> ProductResult<()> {
    match store.warehouse_id {
        Some(pinned) if pinned != warehouse.id => {
            tracing::debug!(
                store_id = store.id,
                pinned_warehouse = pinned,
                warehouse_id = warehouse.id,
                "Store and warehouse mismatch"
            );
            Err(ProductError::StoreWarehouseMismatch)
        }
        _ => Ok(()),
    }
}

fn required_text(field: &str, value: String) -> ProductResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProductError::Validation(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build the persistable draft of a create command. Field rules only;
/// uniqueness and references are checked by the caller.
pub fn draft_from(
    input: CreateProduct,
    created_by: Option<i64>,
    default_qty_alert: i32,
    now: DateTime<Utc>,
) -> ProductResult<NewProduct> {
    let barcode_symbology = parse_optional_enum::<BarcodeSymbology>(
        "barcode_symbology",
        input.barcode_symbology.as_deref(),
    )?;
    let selling_type =
        parse_optional_enum::<SellingType>("selling_type", input.selling_type.as_deref())?;
    let product_type =
        parse_optional_enum::<ProductType>("product_type", input.product_type.as_deref())?
            .unwrap_or_default();
    let tax_type = parse_optional_enum::<TaxType>("tax_type", input.tax_type.as_deref())?;
    let discount_type =
        parse_optional_enum::<DiscountType>("discount_type", input.discount_type.as_deref())?;

    check_dates(input.manufactured_date, input.expired_date)?;

    Ok(NewProduct {
        name: required_text("name", input.name)?,
        slug: required_text("slug", input.slug)?,
        sku: required_text("sku", input.sku)?,
        item_code: optional_text(input.item_code),
        barcode_symbology,
        barcode_value: optional_text(input.barcode_value),
        description: optional_text(input.description),
        price: input.price,
        quantity: input.quantity,
        qty_alert: input.qty_alert.unwrap_or(default_qty_alert),
        discount_type,
        discount_value: input.discount_value.unwrap_or(Decimal::ZERO),
        unit_id: input.unit_id,
        category_id: input.category_id,
        sub_category_id: input.sub_category_id,
        brand_id: input.brand_id,
        store_id: input.store_id,
        warehouse_id: input.warehouse_id,
        selling_type,
        product_type,
        tax_type,
        manufacturer: optional_text(input.manufacturer),
        manufactured_date: input.manufactured_date,
        expired_date: input.expired_date,
        image_url: optional_text(input.image_url),
        status: ProductStatus::Active,
        created_by,
        created_at: now,
    })
}

/// Translate an update command into a patch. Cross-field rules run later
/// against the effective values.
pub fn patch_from(input: UpdateProduct) -> ProductResult<ProductPatch> {
    let status = match input.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(ProductStatus::parse_requested(raw)?),
        None => None,
    };

    Ok(ProductPatch {
        name: input.name.map(|v| required_text("name", v)).transpose()?,
        slug: input.slug.map(|v| required_text("slug", v)).transpose()?,
        sku: input.sku.map(|v| required_text("sku", v)).transpose()?,
        item_code: optional_text(input.item_code),
        barcode_symbology: parse_optional_enum(
            "barcode_symbology",
            input.barcode_symbology.as_deref(),
        )?,
        barcode_value: optional_text(input.barcode_value),
        description: optional_text(input.description),
        price: input.price,
        quantity: input.quantity,
        qty_alert: input.qty_alert,
        discount_type: parse_optional_enum("discount_type", input.discount_type.as_deref())?,
        discount_value: input.discount_value,
        unit_id: input.unit_id,
        category_id: input.category_id,
        sub_category_id: input.sub_category_id,
        brand_id: input.brand_id,
        store_id: input.store_id,
        warehouse_id: input.warehouse_id,
        selling_type: parse_optional_enum("selling_type", input.selling_type.as_deref())?,
        product_type: parse_optional_enum("product_type", input.product_type.as_deref())?,
        tax_type: parse_optional_enum("tax_type", input.tax_type.as_deref())?,
        manufacturer: optional_text(input.manufacturer),
        manufactured_date: input.manufactured_date,
        expired_date: input.expired_date,
        image_url: optional_text(input.image_url),
        status,
    })
}
