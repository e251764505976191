//! Lookup of the entities a product points at.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product};

/// Kinds of entity a product references by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Unit,
    Category,
    SubCategory,
    Brand,
    Store,
    Warehouse,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 6] = [
        ReferenceKind::Unit,
        ReferenceKind::Category,
        ReferenceKind::SubCategory,
        ReferenceKind::Brand,
        ReferenceKind::Store,
        ReferenceKind::Warehouse,
    ];

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Unit => "Unit",
            ReferenceKind::Category => "Category",
            ReferenceKind::SubCategory => "Sub category",
            ReferenceKind::Brand => "Brand",
            ReferenceKind::Store => "Store",
            ReferenceKind::Warehouse => "Warehouse",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Unit => "unit",
            ReferenceKind::Category => "category",
            ReferenceKind::SubCategory => "sub_category",
            ReferenceKind::Brand => "brand",
            ReferenceKind::Store => "store",
            ReferenceKind::Warehouse => "warehouse",
        }
    }
}

/// A resolved reference. `warehouse_id` is only set for stores pinned to a
/// warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub id: i64,
    pub name: String,
    pub status: Option<String>,
    pub warehouse_id: Option<i64>,
}

impl Reference {
    pub fn new(kind: ReferenceKind, id: i64, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
            status: None,
            warehouse_id: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn pinned_to(mut self, warehouse_id: i64) -> Self {
        self.warehouse_id = Some(warehouse_id);
        self
    }

    /// Soft-deleted reference rows count as absent. Inactive ones do not.
    pub fn is_deleted(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("deleted"))
    }
}

/// Reference lookups run inside the caller's transaction, hence `&mut self`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceResolver: Send {
    async fn find_reference(
        &mut self,
        kind: ReferenceKind,
        id: i64,
    ) -> ProductResult<Option<Reference>>;
}

/// Resolve `id` or fail with `ReferenceNotFound`, also when the row is
/// soft-deleted.
pub async fn resolve<R>(resolver: &mut R, kind: ReferenceKind, id: i64) -> ProductResult<Reference>
where
    R: ReferenceResolver + ?Sized,
{
    resolver
        .find_reference(kind, id)
        .await?
        .filter(|reference| !reference.is_deleted())
        .ok_or(ProductError::ReferenceNotFound { kind, id })
}

/// The six ids a product must reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceIds {
    pub unit_id: i64,
    pub category_id: i64,
    pub sub_category_id: i64,
    pub brand_id: i64,
    pub store_id: i64,
    pub warehouse_id: i64,
}

impl ReferenceIds {
    pub fn get(&self, kind: ReferenceKind) -> i64 {
        match kind {
            ReferenceKind::Unit => self.unit_id,
            ReferenceKind::Category => self.category_id,
            ReferenceKind::SubCategory => self.sub_category_id,
            ReferenceKind::Brand => self.brand_id,
            ReferenceKind::Store => self.store_id,
            ReferenceKind::Warehouse => self.warehouse_id,
        }
    }
}

impl From<&NewProduct> for ReferenceIds {
    fn from(draft: &NewProduct) -> Self {
        Self {
            unit_id: draft.unit_id,
            category_id: draft.category_id,
            sub_category_id: draft.sub_category_id,
            brand_id: draft.brand_id,
            store_id: draft.store_id,
            warehouse_id: draft.warehouse_id,
        }
    }
}

impl From<&Product> for ReferenceIds {
    fn from(product: &Product) -> Self {
        Self {
            unit_id: product.unit_id,
            category_id: product.category_id,
            sub_category_id: product.sub_category_id,
            brand_id: product.brand_id,
            store_id: product.store_id,
            warehouse_id: product.warehouse_id,
        }
    }
}

/// Resolve every kind for which `wanted` returns true, in declaration order.
/// Store and warehouse are returned when resolved.
pub async fn resolve_all<R, F>(
    resolver: &mut R,
    ids: &ReferenceIds,
    mut wanted: F,
) -> ProductResult<(Option<Reference>, Option<Reference>)>
where
    R: ReferenceResolver + ?Sized,
    F: FnMut(ReferenceKind) -> bool,
{
    let mut store = None;
    let mut warehouse = None;

    for kind in ReferenceKind::ALL {
        if !wanted(kind) {
            continue;
        }
        let reference = resolve(resolver, kind, ids.get(kind)).await?;
        match kind {
            ReferenceKind::Store => store = Some(reference),
            ReferenceKind::Warehouse => warehouse = Some(reference),
            _ => {}
        }
    }

    Ok((store, warehouse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn ids() -> ReferenceIds {
        ReferenceIds {
            unit_id: 1,
            category_id: 2,
            sub_category_id: 3,
            brand_id: 4,
            store_id: 5,
            warehouse_id: 6,
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_reference() {
        let mut resolver = MockReferenceResolver::new();
        resolver
            .expect_find_reference()
            .with(eq(ReferenceKind::Brand), eq(9))
            .times(1)
            .returning(|_, _| Ok(None));

        let err = resolve(&mut resolver, ReferenceKind::Brand, 9).await.unwrap_err();
        assert!(matches!(
            err,
            ProductError::ReferenceNotFound { kind: ReferenceKind::Brand, id: 9 }
        ));
        assert_eq!(err.to_string(), "Brand not found");
    }

    #[tokio::test]
    async fn test_resolve_treats_deleted_reference_as_missing() {
        let mut resolver = MockReferenceResolver::new();
        resolver
            .expect_find_reference()
            .returning(|kind, id| {
                let status = if id == 9 { "DELETED" } else { "inactive" };
                Ok(Some(Reference::new(kind, id, "Acme").with_status(status)))
            });

        let err = resolve(&mut resolver, ReferenceKind::Brand, 9).await.unwrap_err();
        assert!(matches!(
            err,
            ProductError::ReferenceNotFound { kind: ReferenceKind::Brand, id: 9 }
        ));

        let inactive = resolve(&mut resolver, ReferenceKind::Brand, 4).await.unwrap();
        assert_eq!(inactive.status.as_deref(), Some("inactive"));
    }

    #[tokio::test]
    async fn test_resolve_all_returns_placement() {
        let mut resolver = MockReferenceResolver::new();
        resolver
            .expect_find_reference()
            .times(6)
            .returning(|kind, id| {
                let reference = Reference::new(kind, id, format!("{}-{}", kind.as_str(), id));
                Ok(Some(match kind {
                    ReferenceKind::Store => reference.pinned_to(6),
                    _ => reference,
                }))
            });

        let (store, warehouse) = resolve_all(&mut resolver, &ids(), |_| true).await.unwrap();
        assert_eq!(store.unwrap().warehouse_id, Some(6));
        assert_eq!(warehouse.unwrap().id, 6);
    }

    #[tokio::test]
    async fn test_resolve_all_stops_at_first_missing() {
        let mut resolver = MockReferenceResolver::new();
        resolver
            .expect_find_reference()
            .with(eq(ReferenceKind::Unit), eq(1))
            .times(1)
            .returning(|_, _| Ok(None));

        let err = resolve_all(&mut resolver, &ids(), |_| true).await.unwrap_err();
        assert!(matches!(
            err,
            ProductError::ReferenceNotFound { kind: ReferenceKind::Unit, id: 1 }
        ));
    }

    #[tokio::test]
    async fn test_resolve_all_skips_unwanted_kinds() {
        let mut resolver = MockReferenceResolver::new();
        resolver
            .expect_find_reference()
            .with(eq(ReferenceKind::Category), eq(2))
            .times(1)
            .returning(|kind, id| Ok(Some(Reference::new(kind, id, "Food"))));

        let (store, warehouse) =
            resolve_all(&mut resolver, &ids(), |kind| kind == ReferenceKind::Category)
                .await
                .unwrap();
        assert!(store.is_none());
        assert!(warehouse.is_none());
    }
}
