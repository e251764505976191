use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::lifecycle::ProductStatus;

/// Barcode encoding
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BarcodeSymbology {
    #[sea_orm(string_value = "ean13")]
    Ean13,
    #[sea_orm(string_value = "upc_a")]
    UpcA,
    #[sea_orm(string_value = "code128")]
    Code128,
    #[sea_orm(string_value = "code39")]
    Code39,
    #[sea_orm(string_value = "qr")]
    Qr,
}

/// How a product is sold
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SellingType {
    #[sea_orm(string_value = "unit")]
    Unit,
    #[sea_orm(string_value = "weight")]
    Weight,
    #[sea_orm(string_value = "service")]
    Service,
}

/// Single product or product with variants
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductType {
    #[default]
    #[sea_orm(string_value = "single")]
    Single,
    #[sea_orm(string_value = "variable")]
    Variable,
}

/// Tax treatment of the price
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TaxType {
    #[sea_orm(string_value = "inclusive")]
    Inclusive,
    #[sea_orm(string_value = "exclusive")]
    Exclusive,
    /// No tax applies
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    #[sea_orm(string_value = "none")]
    Untaxed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DiscountType {
    #[sea_orm(string_value = "percent")]
    Percent,
    #[sea_orm(string_value = "amount")]
    Amount,
}

/// Product value as persisted. Never mutated in place; see [`Product::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub item_code: Option<String>,
    pub barcode_symbology: Option<BarcodeSymbology>,
    pub barcode_value: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    /// Low-stock threshold
    pub qty_alert: i32,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Decimal,
    pub unit_id: i64,
    pub category_id: i64,
    pub sub_category_id: i64,
    pub brand_id: i64,
    pub store_id: i64,
    pub warehouse_id: i64,
    pub selling_type: Option<SellingType>,
    pub product_type: ProductType,
    pub tax_type: Option<TaxType>,
    pub manufacturer: Option<String>,
    pub manufactured_date: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated product that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub item_code: Option<String>,
    pub barcode_symbology: Option<BarcodeSymbology>,
    pub barcode_value: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub qty_alert: i32,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Decimal,
    pub unit_id: i64,
    pub category_id: i64,
    pub sub_category_id: i64,
    pub brand_id: i64,
    pub store_id: i64,
    pub warehouse_id: i64,
    pub selling_type: Option<SellingType>,
    pub product_type: ProductType,
    pub tax_type: Option<TaxType>,
    pub manufacturer: Option<String>,
    pub manufactured_date: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            slug: self.slug,
            sku: self.sku,
            item_code: self.item_code,
            barcode_symbology: self.barcode_symbology,
            barcode_value: self.barcode_value,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            qty_alert: self.qty_alert,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            unit_id: self.unit_id,
            category_id: self.category_id,
            sub_category_id: self.sub_category_id,
            brand_id: self.brand_id,
            store_id: self.store_id,
            warehouse_id: self.warehouse_id,
            selling_type: self.selling_type,
            product_type: self.product_type,
            tax_type: self.tax_type,
            manufacturer: self.manufacturer,
            manufactured_date: self.manufactured_date,
            expired_date: self.expired_date,
            image_url: self.image_url,
            status: self.status,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl NewProduct {
    /// Draft of a copy of `source` under new unique keys. Everything else,
    /// creator and status included, carries over.
    pub fn copy_of(
        source: &Product,
        sku: String,
        slug: String,
        item_code: Option<String>,
        now: DateTime<Utc>,
    ) -> NewProduct {
        NewProduct {
            name: source.name.clone(),
            slug,
            sku,
            item_code,
            barcode_symbology: source.barcode_symbology,
            barcode_value: source.barcode_value.clone(),
            description: source.description.clone(),
            price: source.price,
            quantity: source.quantity,
            qty_alert: source.qty_alert,
            discount_type: source.discount_type,
            discount_value: source.discount_value,
            unit_id: source.unit_id,
            category_id: source.category_id,
            sub_category_id: source.sub_category_id,
            brand_id: source.brand_id,
            store_id: source.store_id,
            warehouse_id: source.warehouse_id,
            selling_type: source.selling_type,
            product_type: source.product_type,
            tax_type: source.tax_type,
            manufacturer: source.manufacturer.clone(),
            manufactured_date: source.manufactured_date,
            expired_date: source.expired_date,
            image_url: source.image_url.clone(),
            status: source.status,
            created_by: source.created_by,
            created_at: now,
        }
    }
}

/// Fields a caller intends to change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub item_code: Option<String>,
    pub barcode_symbology: Option<BarcodeSymbology>,
    pub barcode_value: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub qty_alert: Option<i32>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub unit_id: Option<i64>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub store_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub selling_type: Option<SellingType>,
    pub product_type: Option<ProductType>,
    pub tax_type: Option<TaxType>,
    pub manufacturer: Option<String>,
    pub manufactured_date: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProductPatch::default()
    }

    /// True when the patch touches store or warehouse placement.
    pub fn touches_placement(&self) -> bool {
        self.store_id.is_some() || self.warehouse_id.is_some()
    }
}

impl Product {
    /// Produce the next value with `patch` applied. `updated_at` never moves
    /// backwards.
    pub fn apply(&self, patch: &ProductPatch, now: DateTime<Utc>) -> Product {
        fn pick<T: Clone>(next: &Option<T>, current: &T) -> T {
            next.clone().unwrap_or_else(|| current.clone())
        }
        fn pick_opt<T: Clone>(next: &Option<T>, current: &Option<T>) -> Option<T> {
            next.clone().or_else(|| current.clone())
        }

        Product {
            id: self.id,
            name: pick(&patch.name, &self.name),
            slug: pick(&patch.slug, &self.slug),
            sku: pick(&patch.sku, &self.sku),
            item_code: pick_opt(&patch.item_code, &self.item_code),
            barcode_symbology: pick_opt(&patch.barcode_symbology, &self.barcode_symbology),
            barcode_value: pick_opt(&patch.barcode_value, &self.barcode_value),
            description: pick_opt(&patch.description, &self.description),
            price: pick(&patch.price, &self.price),
            quantity: pick(&patch.quantity, &self.quantity),
            qty_alert: pick(&patch.qty_alert, &self.qty_alert),
            discount_type: pick_opt(&patch.discount_type, &self.discount_type),
            discount_value: pick(&patch.discount_value, &self.discount_value),
            unit_id: pick(&patch.unit_id, &self.unit_id),
            category_id: pick(&patch.category_id, &self.category_id),
            sub_category_id: pick(&patch.sub_category_id, &self.sub_category_id),
            brand_id: pick(&patch.brand_id, &self.brand_id),
            store_id: pick(&patch.store_id, &self.store_id),
            warehouse_id: pick(&patch.warehouse_id, &self.warehouse_id),
            selling_type: pick_opt(&patch.selling_type, &self.selling_type),
            product_type: pick(&patch.product_type, &self.product_type),
            tax_type: pick_opt(&patch.tax_type, &self.tax_type),
            manufacturer: pick_opt(&patch.manufacturer, &self.manufacturer),
            manufactured_date: pick_opt(&patch.manufactured_date, &self.manufactured_date),
            expired_date: pick_opt(&patch.expired_date, &self.expired_date),
            image_url: pick_opt(&patch.image_url, &self.image_url),
            status: pick(&patch.status, &self.status),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
        }
    }
}

/// DTO for creating a product. Enumerated fields are taken as text and
/// matched case-insensitively.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 150))]
    pub slug: String,
    #[validate(length(min = 1, max = 20))]
    pub sku: String,
    #[validate(length(max = 50))]
    #[serde(default, alias = "itemCode")]
    pub item_code: Option<String>,
    /// One of ean13, upc_a, code128, code39, qr
    #[serde(default, alias = "barcodeSymbology")]
    pub barcode_symbology: Option<String>,
    #[validate(length(max = 128))]
    #[serde(default, alias = "barcodeValue")]
    pub barcode_value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "9.99")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub quantity: i32,
    #[validate(range(min = 0))]
    #[serde(default, alias = "qtyAlert")]
    pub qty_alert: Option<i32>,
    /// One of percent, amount
    #[serde(default, alias = "discountType")]
    pub discount_type: Option<String>,
    #[validate(custom(function = "validate_amount"))]
    #[serde(default, alias = "discountValue")]
    #[schema(value_type = Option<String>)]
    pub discount_value: Option<Decimal>,
    #[validate(range(min = 1))]
    #[serde(alias = "unitId")]
    pub unit_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "categoryId")]
    pub category_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "subCategoryId")]
    pub sub_category_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "brandId")]
    pub brand_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "storeId")]
    pub store_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "warehouseId")]
    pub warehouse_id: i64,
    /// One of unit, weight, service
    #[serde(default, alias = "sellingType")]
    pub selling_type: Option<String>,
    /// One of single, variable; defaults to single
    #[serde(default, alias = "productType")]
    pub product_type: Option<String>,
    /// One of inclusive, exclusive, none
    #[serde(default, alias = "taxType")]
    pub tax_type: Option<String>,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default, alias = "manufacturedDate")]
    pub manufactured_date: Option<NaiveDate>,
    #[serde(default, alias = "expiredDate")]
    pub expired_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

/// DTO for a partial update. Absent or null fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub sku: Option<String>,
    #[validate(length(max = 50))]
    #[serde(default, alias = "itemCode")]
    pub item_code: Option<String>,
    #[serde(default, alias = "barcodeSymbology")]
    pub barcode_symbology: Option<String>,
    #[validate(length(max = 128))]
    #[serde(default, alias = "barcodeValue")]
    pub barcode_value: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    #[serde(default, alias = "qtyAlert")]
    pub qty_alert: Option<i32>,
    #[serde(default, alias = "discountType")]
    pub discount_type: Option<String>,
    #[validate(custom(function = "validate_amount"))]
    #[serde(default, alias = "discountValue")]
    #[schema(value_type = Option<String>)]
    pub discount_value: Option<Decimal>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "unitId")]
    pub unit_id: Option<i64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<i64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "subCategoryId")]
    pub sub_category_id: Option<i64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "brandId")]
    pub brand_id: Option<i64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "storeId")]
    pub store_id: Option<i64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "warehouseId")]
    pub warehouse_id: Option<i64>,
    #[serde(default, alias = "sellingType")]
    pub selling_type: Option<String>,
    #[serde(default, alias = "productType")]
    pub product_type: Option<String>,
    #[serde(default, alias = "taxType")]
    pub tax_type: Option<String>,
    #[validate(length(max = 150))]
    pub manufacturer: Option<String>,
    #[serde(default, alias = "manufacturedDate")]
    pub manufactured_date: Option<NaiveDate>,
    #[serde(default, alias = "expiredDate")]
    pub expired_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    /// active or inactive
    pub status: Option<String>,
}

/// Query parameters of the main product listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Zero-based page index (default 0)
    pub page: Option<u64>,
    /// Page size (default 10)
    pub size: Option<u64>,
    /// Case-insensitive match on name, sku or item code
    pub search: Option<String>,
    /// active or inactive; DELETED yields an empty page
    pub status: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i64>,
    #[serde(alias = "brandId")]
    pub brand_id: Option<i64>,
    #[serde(alias = "unitId")]
    pub unit_id: Option<i64>,
    #[serde(alias = "subCategoryId")]
    pub sub_category_id: Option<i64>,
    #[serde(alias = "storeId")]
    pub store_id: Option<i64>,
    #[serde(alias = "warehouseId")]
    pub warehouse_id: Option<i64>,
    #[serde(alias = "productType")]
    pub product_type: Option<String>,
    #[serde(alias = "sellingType")]
    pub selling_type: Option<String>,
    /// Sort field (default created_at)
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    /// asc or desc (default desc)
    #[serde(alias = "sortDir")]
    pub sort_dir: Option<String>,
}

/// Query parameters of the stock management view
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub search: Option<String>,
    #[serde(alias = "storeId")]
    pub store_id: Option<i64>,
    #[serde(alias = "warehouseId")]
    pub warehouse_id: Option<i64>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i64>,
    #[serde(alias = "brandId")]
    pub brand_id: Option<i64>,
    #[serde(alias = "unitId")]
    pub unit_id: Option<i64>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortDir")]
    pub sort_dir: Option<String>,
}

/// Query parameters of the low-stock view
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    /// Fixed threshold; when absent each product's own qty_alert applies
    pub threshold: Option<i32>,
    /// Sort field (default quantity)
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    /// asc or desc (default asc)
    #[serde(alias = "sortDir")]
    pub sort_dir: Option<String>,
}

/// Query parameters of the expired view
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiredParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    /// Sort field (default expired_date)
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortDir")]
    pub sort_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusParams {
    /// active or inactive
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Multipart body of the file import endpoint
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ImportFile {
    /// CSV file
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("price_positive")
            .with_message("price must be greater than 0".into()));
    }
    check_scale(price)
}

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::new("amount_non_negative")
            .with_message("value must not be negative".into()));
    }
    check_scale(amount)
}

fn check_scale(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > 2 {
        return Err(ValidationError::new("scale")
            .with_message("at most 2 decimal places are allowed".into()));
    }
    Ok(())
}
