//! Outward representation of products.
//!
//! Display names are resolved in one batch per page by the repository
//! ([`NameRequest`] in, [`DisplayNames`] out) and merged here without
//! further lookups.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ProductError, ProductResult};
use crate::lifecycle::ProductStatus;
use crate::models::{
    BarcodeSymbology, DiscountType, Product, ProductType, SellingType, TaxType,
};
use crate::query::Page;
use crate::resolver::ReferenceKind;

/// Ids whose display names a set of products needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRequest {
    pub references: BTreeMap<ReferenceKind, BTreeSet<i64>>,
    pub users: BTreeSet<i64>,
}

impl NameRequest {
    pub fn for_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut request = NameRequest::default();
        for product in products {
            for (kind, id) in [
                (ReferenceKind::Unit, product.unit_id),
                (ReferenceKind::Category, product.category_id),
                (ReferenceKind::SubCategory, product.sub_category_id),
                (ReferenceKind::Brand, product.brand_id),
                (ReferenceKind::Store, product.store_id),
                (ReferenceKind::Warehouse, product.warehouse_id),
            ] {
                request.references.entry(kind).or_default().insert(id);
            }
            if let Some(user) = product.created_by {
                request.users.insert(user);
            }
        }
        request
    }

    pub fn ids(&self, kind: ReferenceKind) -> Vec<i64> {
        self.references
            .get(&kind)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.references.values().all(BTreeSet::is_empty) && self.users.is_empty()
    }
}

/// Resolved names. Units are named by their short name.
#[derive(Debug, Clone, Default)]
pub struct DisplayNames {
    references: HashMap<(ReferenceKind, i64), String>,
    users: HashMap<i64, String>,
}

impl DisplayNames {
    pub fn insert(&mut self, kind: ReferenceKind, id: i64, name: impl Into<String>) {
        self.references.insert((kind, id), name.into());
    }

    pub fn insert_user(&mut self, id: i64, name: impl Into<String>) {
        self.users.insert(id, name.into());
    }

    pub fn name(&self, kind: ReferenceKind, id: i64) -> Option<String> {
        self.references.get(&(kind, id)).cloned()
    }

    pub fn user(&self, id: Option<i64>) -> Option<String> {
        id.and_then(|id| self.users.get(&id).cloned())
    }
}

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub item_code: Option<String>,
    pub barcode_symbology: Option<BarcodeSymbology>,
    pub barcode_value: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String, example = "9.99")]
    pub price: Decimal,
    pub quantity: i32,
    pub qty_alert: i32,
    pub discount_type: Option<DiscountType>,
    #[schema(value_type = String, example = "0.00")]
    pub discount_value: Decimal,
    pub unit_id: i64,
    pub unit_short_name: Option<String>,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub sub_category_id: i64,
    pub sub_category_name: Option<String>,
    pub brand_id: i64,
    pub brand_name: Option<String>,
    pub store_id: i64,
    pub store_name: Option<String>,
    pub warehouse_id: i64,
    pub warehouse_name: Option<String>,
    pub selling_type: Option<SellingType>,
    pub product_type: ProductType,
    pub tax_type: Option<TaxType>,
    pub manufacturer: Option<String>,
    pub manufactured_date: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    pub fn assemble(product: Product, names: &DisplayNames) -> Self {
        Self {
            unit_short_name: names.name(ReferenceKind::Unit, product.unit_id),
            category_name: names.name(ReferenceKind::Category, product.category_id),
            sub_category_name: names.name(ReferenceKind::SubCategory, product.sub_category_id),
            brand_name: names.name(ReferenceKind::Brand, product.brand_id),
            store_name: names.name(ReferenceKind::Store, product.store_id),
            warehouse_name: names.name(ReferenceKind::Warehouse, product.warehouse_id),
            created_by_name: names.user(product.created_by),
            id: product.id,
            name: product.name,
            slug: product.slug,
            sku: product.sku,
            item_code: product.item_code,
            barcode_symbology: product.barcode_symbology,
            barcode_value: product.barcode_value,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            qty_alert: product.qty_alert,
            discount_type: product.discount_type,
            discount_value: product.discount_value,
            unit_id: product.unit_id,
            category_id: product.category_id,
            sub_category_id: product.sub_category_id,
            brand_id: product.brand_id,
            store_id: product.store_id,
            warehouse_id: product.warehouse_id,
            selling_type: product.selling_type,
            product_type: product.product_type,
            tax_type: product.tax_type,
            manufacturer: product.manufacturer,
            manufactured_date: product.manufactured_date,
            expired_date: product.expired_date,
            image_url: product.image_url,
            status: product.status,
            created_by: product.created_by,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    /// Zero-based index of this page
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl From<Page<ProductView>> for ProductPage {
    fn from(page: Page<ProductView>) -> Self {
        Self {
            current_page: page.index,
            total_pages: page.total_pages(),
            total_items: page.total_items,
            items: page.items,
        }
    }
}

/// What a barcode renderer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BarcodeData {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub symbology: BarcodeSymbology,
    pub value: String,
}

impl BarcodeData {
    pub fn from_product(product: &Product) -> ProductResult<Self> {
        match (product.barcode_symbology, product.barcode_value.as_deref()) {
            (Some(symbology), Some(value)) if !value.is_empty() => Ok(Self {
                id: product.id,
                name: product.name.clone(),
                sku: product.sku.clone(),
                symbology,
                value: value.to_string(),
            }),
            _ => Err(ProductError::BarcodeUnavailable(product.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_product;

    #[test]
    fn test_name_request_deduplicates_ids() {
        let a = sample_product();
        let mut b = sample_product();
        b.id = 2;
        b.brand_id = 9;
        b.created_by = None;

        let request = NameRequest::for_products([&a, &b]);
        assert_eq!(request.ids(ReferenceKind::Unit), vec![1]);
        assert_eq!(request.ids(ReferenceKind::Brand), vec![1, 9]);
        assert_eq!(request.users.len(), 1);
    }

    #[test]
    fn test_assemble_merges_names() {
        let mut names = DisplayNames::default();
        names.insert(ReferenceKind::Unit, 1, "pc");
        names.insert(ReferenceKind::Brand, 1, "Acme");
        names.insert_user(7, "Jordan");

        let view = ProductView::assemble(sample_product(), &names);
        assert_eq!(view.unit_short_name.as_deref(), Some("pc"));
        assert_eq!(view.brand_name.as_deref(), Some("Acme"));
        assert_eq!(view.category_name, None);
        assert_eq!(view.created_by_name.as_deref(), Some("Jordan"));
        assert_eq!(view.sku, "SKU1");
    }

    #[test]
    fn test_page_metadata() {
        let page = Page {
            items: vec![ProductView::assemble(sample_product(), &DisplayNames::default())],
            index: 2,
            size: 10,
            total_items: 21,
        };
        let response = ProductPage::from(page);
        assert_eq!(response.current_page, 2);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items.len(), 1);
    }

    #[test]
    fn test_barcode_requires_symbology_and_value() {
        let mut product = sample_product();
        assert!(matches!(
            BarcodeData::from_product(&product),
            Err(ProductError::BarcodeUnavailable(1))
        ));

        product.barcode_symbology = Some(BarcodeSymbology::Ean13);
        product.barcode_value = Some("4006381333931".into());
        let data = BarcodeData::from_product(&product).unwrap();
        assert_eq!(data.symbology, BarcodeSymbology::Ean13);
        assert_eq!(data.value, "4006381333931");
    }
}
