use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product};
use crate::projection::{DisplayNames, NameRequest};
use crate::query::{Page, ProductQuery};
use crate::resolver::{Reference, ReferenceKind, ReferenceResolver};
use crate::uniqueness::{KeyLookup, UniqueKey};

/// One unit of work. Everything read or written through it commits
/// together; dropping it without [`commit`](ProductTransaction::commit)
/// rolls back.
#[async_trait]
pub trait ProductTransaction: ReferenceResolver + KeyLookup + Send + Sized {
    /// Fetch a product regardless of status
    async fn find_product(&mut self, id: i64) -> ProductResult<Option<Product>>;

    /// Persist a draft. Unique key collisions surface as `DuplicateKey`.
    async fn insert(&mut self, draft: NewProduct) -> ProductResult<Product>;

    /// Overwrite the stored row with `product`
    async fn update(&mut self, product: &Product) -> ProductResult<Product>;

    async fn commit(self) -> ProductResult<()>;
}

/// Repository trait for product persistence
///
/// Writes go through [`ProductRepository::begin`]; reads run directly.
#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    type Tx: ProductTransaction;

    async fn begin(&self) -> ProductResult<Self::Tx>;

    /// Get a product by id, including soft-deleted rows
    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>>;

    async fn search(&self, query: &ProductQuery) -> ProductResult<Page<Product>>;

    /// Resolve display names for a whole page in one batch
    async fn display_names(&self, request: &NameRequest) -> ProductResult<DisplayNames>;
}

#[derive(Debug, Clone)]
struct CatalogState {
    products: BTreeMap<i64, Product>,
    next_id: i64,
    references: HashMap<(ReferenceKind, i64), Reference>,
    users: HashMap<i64, String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: BTreeMap::new(),
            next_id: 1,
            references: HashMap::new(),
            users: HashMap::new(),
        }
    }
}

impl CatalogState {
    fn holder_of(&self, key: UniqueKey, value: &str, exclude: Option<i64>) -> Option<i64> {
        self.products
            .values()
            .filter(|p| Some(p.id) != exclude)
            .find(|p| match key {
                UniqueKey::Sku => p.sku == value,
                UniqueKey::Slug => p.slug == value,
                UniqueKey::ItemCode => p.item_code.as_deref() == Some(value),
            })
            .map(|p| p.id)
    }

    /// Mirrors the unique indexes of the products table.
    fn check_unique(&self, product: &Product) -> ProductResult<()> {
        let exclude = Some(product.id);
        if self.holder_of(UniqueKey::Sku, &product.sku, exclude).is_some() {
            return Err(UniqueKey::Sku.duplicate(product.sku.clone()));
        }
        if self.holder_of(UniqueKey::Slug, &product.slug, exclude).is_some() {
            return Err(UniqueKey::Slug.duplicate(product.slug.clone()));
        }
        if let Some(code) = product.item_code.as_deref() {
            if self.holder_of(UniqueKey::ItemCode, code, exclude).is_some() {
                return Err(UniqueKey::ItemCode.duplicate(code));
            }
        }
        Ok(())
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// A transaction holds the write lock for its whole life and works on a
/// copy of the state that replaces the original on commit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit, category, sub-category, brand, store or warehouse.
    pub async fn add_reference(&self, reference: Reference) {
        let mut state = self.state.write().await;
        state
            .references
            .insert((reference.kind, reference.id), reference);
    }

    pub async fn add_user(&self, id: i64, name: impl Into<String>) {
        self.state.write().await.users.insert(id, name.into());
    }

    /// Every stored product, soft-deleted ones included.
    pub async fn snapshot(&self) -> Vec<Product> {
        self.state.read().await.products.values().cloned().collect()
    }
}

pub struct InMemoryTransaction {
    guard: OwnedRwLockWriteGuard<CatalogState>,
    working: CatalogState,
}

#[async_trait]
impl ReferenceResolver for InMemoryTransaction {
    async fn find_reference(
        &mut self,
        kind: ReferenceKind,
        id: i64,
    ) -> ProductResult<Option<Reference>> {
        Ok(self.working.references.get(&(kind, id)).cloned())
    }
}

#[async_trait]
impl KeyLookup for InMemoryTransaction {
    async fn key_taken(
        &mut self,
        key: UniqueKey,
        value: &str,
        exclude: Option<i64>,
    ) -> ProductResult<bool> {
        Ok(self.working.holder_of(key, value, exclude).is_some())
    }
}

#[async_trait]
impl ProductTransaction for InMemoryTransaction {
    async fn find_product(&mut self, id: i64) -> ProductResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn insert(&mut self, draft: NewProduct) -> ProductResult<Product> {
        let product = draft.into_product(self.working.next_id);
        self.working.check_unique(&product)?;
        self.working.next_id += 1;
        self.working.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&mut self, product: &Product) -> ProductResult<Product> {
        if !self.working.products.contains_key(&product.id) {
            return Err(ProductError::NotFound(product.id));
        }
        self.working.check_unique(product)?;
        self.working.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn commit(self) -> ProductResult<()> {
        let InMemoryTransaction { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> ProductResult<Self::Tx> {
        let guard = self.state.clone().write_owned().await;
        let working = (*guard).clone();
        Ok(InMemoryTransaction { guard, working })
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn search(&self, query: &ProductQuery) -> ProductResult<Page<Product>> {
        let state = self.state.read().await;
        Ok(query.evaluate(state.products.values()))
    }

    async fn display_names(&self, request: &NameRequest) -> ProductResult<DisplayNames> {
        let state = self.state.read().await;
        let mut names = DisplayNames::default();

        for (kind, ids) in &request.references {
            for id in ids {
                if let Some(reference) = state.references.get(&(*kind, *id)) {
                    names.insert(*kind, *id, reference.name.clone());
                }
            }
        }
        for id in &request.users {
            if let Some(name) = state.users.get(id) {
                names.insert_user(*id, name.clone());
            }
        }

        Ok(names)
    }
}
