//! Shared values for unit tests.

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::lifecycle::ProductStatus;
use crate::models::{CreateProduct, NewProduct, Product, ProductType};

pub(crate) fn new_product() -> NewProduct {
    NewProduct {
        name: "Widget".into(),
        slug: "widget".into(),
        sku: "SKU1".into(),
        item_code: None,
        barcode_symbology: None,
        barcode_value: None,
        description: None,
        price: Decimal::from_str("9.99").unwrap(),
        quantity: 5,
        qty_alert: 10,
        discount_type: None,
        discount_value: Decimal::ZERO,
        unit_id: 1,
        category_id: 1,
        sub_category_id: 1,
        brand_id: 1,
        store_id: 1,
        warehouse_id: 1,
        selling_type: None,
        product_type: ProductType::Single,
        tax_type: None,
        manufacturer: None,
        manufactured_date: None,
        expired_date: None,
        image_url: None,
        status: ProductStatus::Active,
        created_by: Some(7),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub(crate) fn sample_product() -> Product {
    new_product().into_product(1)
}

pub(crate) fn create_command() -> CreateProduct {
    CreateProduct {
        name: "Widget".into(),
        slug: "sku1".into(),
        sku: "SKU1".into(),
        price: Decimal::from_str("9.99").unwrap(),
        quantity: 5,
        unit_id: 1,
        category_id: 1,
        sub_category_id: 1,
        brand_id: 1,
        store_id: 1,
        warehouse_id: 1,
        ..Default::default()
    }
}
