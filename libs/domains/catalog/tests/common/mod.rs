//! Shared setup for catalog integration tests.
#![allow(dead_code)]

use std::str::FromStr;

use domain_catalog::{CreateProduct, InMemoryProductRepository, Reference, ReferenceKind};
use rust_decimal::Decimal;

pub const CREATOR: i64 = 7;

/// Every reference kind with id 1, plus a second warehouse and a store
/// pinned to it:
///
/// - store 1: unpinned
/// - store 2 "Downtown": pinned to warehouse 2 "Annex"
pub async fn seeded_repo() -> InMemoryProductRepository {
    let repo = InMemoryProductRepository::new();
    for kind in ReferenceKind::ALL {
        let name = match kind {
            ReferenceKind::Unit => "pc".to_string(),
            other => format!("{} 1", other.label()),
        };
        repo.add_reference(Reference::new(kind, 1, name).with_status("active"))
            .await;
    }
    repo.add_reference(Reference::new(ReferenceKind::Warehouse, 2, "Annex"))
        .await;
    repo.add_reference(Reference::new(ReferenceKind::Store, 2, "Downtown").pinned_to(2))
        .await;
    repo.add_user(CREATOR, "Jordan").await;
    repo
}

pub fn decimal(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

pub fn widget(sku: &str, slug: &str) -> CreateProduct {
    CreateProduct {
        name: "Widget".to_string(),
        slug: slug.to_string(),
        sku: sku.to_string(),
        price: decimal("9.99"),
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

pub const CSV_HEADER: &str =
    "name,sku,slug,price,quantity,unitId,categoryId,brandId,subCategoryId,storeId,warehouseId";
