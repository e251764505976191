use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use core_config::CatalogConfig;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::import::{ImportReport, parse_csv};
use crate::invariants::{check_dates, check_placement, draft_from, patch_from};
use crate::lifecycle::{ProductStatus, require_visible};
use crate::models::{
    CreateProduct, ExpiredParams, LowStockParams, NewProduct, Product, ProductListParams,
    ProductPatch, StockParams, UpdateProduct,
};
use crate::projection::{BarcodeData, NameRequest, ProductPage, ProductView};
use crate::query::ProductQuery;
use crate::repository::{ProductRepository, ProductTransaction};
use crate::resolver::{ReferenceIds, ReferenceKind, resolve_all};
use crate::uniqueness::{check_create, check_update, copy_keys, key_suffix};

/// Service layer for the product catalog
///
/// Every write runs in one repository transaction; a failed check drops the
/// transaction before anything is written.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    config: CatalogConfig,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, CatalogConfig::default())
    }

    pub fn with_config(repository: R, config: CatalogConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Main product listing
    #[instrument(skip(self, params))]
    pub async fn list_products(&self, params: ProductListParams) -> ProductResult<ProductPage> {
        let query = ProductQuery::list(&params, self.config.max_page_size)?;
        self.run_query(query).await
    }

    /// Stock management view
    #[instrument(skip(self, params))]
    pub async fn manage_stock(&self, params: StockParams) -> ProductResult<ProductPage> {
        let query = ProductQuery::stocks(&params, self.config.max_page_size)?;
        self.run_query(query).await
    }

    #[instrument(skip(self, params), fields(threshold = ?params.threshold))]
    pub async fn low_stocks(&self, params: LowStockParams) -> ProductResult<ProductPage> {
        let query = ProductQuery::low_stock(&params, self.config.max_page_size)?;
        self.run_query(query).await
    }

    /// Products whose expiry date is today or earlier
    pub async fn expired_products(&self, params: ExpiredParams) -> ProductResult<ProductPage> {
        self.expired_products_on(params, Utc::now().date_naive()).await
    }

    #[instrument(skip(self, params))]
    pub async fn expired_products_on(
        &self,
        params: ExpiredParams,
        today: NaiveDate,
    ) -> ProductResult<ProductPage> {
        let query = ProductQuery::expired(&params, today, self.config.max_page_size)?;
        self.run_query(query).await
    }

    /// Get a visible product by id
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: i64) -> ProductResult<ProductView> {
        let product = require_visible(id, self.repository.get_by_id(id).await?)?;
        self.project(product).await
    }

    /// Create a product owned by `actor`
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
        actor: Option<i64>,
    ) -> ProductResult<ProductView> {
        let product = self.insert_new(input, actor).await?;
        tracing::info!(product_id = %product.id, sku = %product.sku, "Created product");
        self.project(product).await
    }

    /// Apply a partial update. Only submitted fields change.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(&self, id: i64, input: UpdateProduct) -> ProductResult<ProductView> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;
        let patch = patch_from(input)?;

        let mut tx = self.repository.begin().await?;
        let current = require_visible(id, tx.find_product(id).await?)?;
        if patch.is_empty() {
            drop(tx);
            return self.project(current).await;
        }

        let next = current.apply(&patch, Utc::now());
        check_dates(next.manufactured_date, next.expired_date)?;
        check_update(&mut tx, &current, &next).await?;

        let ids = ReferenceIds::from(&next);
        let (store, warehouse) =
            resolve_all(&mut tx, &ids, |kind| submitted(&patch, kind)).await?;
        if let (Some(store), Some(warehouse)) = (&store, &warehouse) {
            check_placement(store, warehouse)?;
        }

        let updated = tx.update(&next).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, "Updated product");
        self.project(updated).await
    }

    /// Soft delete. The row keeps its keys.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: i64) -> ProductResult<()> {
        self.set_status(id, ProductStatus::Deleted).await?;
        tracing::info!(product_id = %id, "Deleted product");
        Ok(())
    }

    /// Switch between `active` and `inactive`
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_status(&self, id: i64, status: &str) -> ProductResult<ProductView> {
        let requested = ProductStatus::parse_requested(status)?;
        let product = self.set_status(id, requested).await?;
        tracing::info!(product_id = %id, status = %product.status, "Updated product status");
        self.project(product).await
    }

    /// Copy a product under freshly generated unique keys
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn duplicate_product(&self, id: i64) -> ProductResult<ProductView> {
        let mut tx = self.repository.begin().await?;
        let source = require_visible(id, tx.find_product(id).await?)?;

        let keys = copy_keys(&mut tx, &source, key_suffix).await?;
        let draft = NewProduct::copy_of(&source, keys.sku, keys.slug, keys.item_code, Utc::now());

        let copy = tx.insert(draft).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, copy_id = %copy.id, sku = %copy.sku, "Duplicated product");
        self.project(copy).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn barcode_data(&self, id: i64) -> ProductResult<BarcodeData> {
        let product = require_visible(id, self.repository.get_by_id(id).await?)?;
        BarcodeData::from_product(&product)
    }

    /// Import raw CSV bytes, e.g. from a file upload
    pub async fn import_bytes(&self, content: &[u8], actor: Option<i64>) -> ProductResult<ImportReport> {
        self.check_import_size(content.len())?;
        let text = std::str::from_utf8(content).map_err(|_| {
            ProductError::Configuration("CSV content is not valid UTF-8".to_string())
        })?;
        self.import_csv(text, actor).await
    }

    /// Import CSV text. Each row is created in its own transaction; a failed
    /// row is reported and the rest continue.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn import_csv(&self, content: &str, actor: Option<i64>) -> ProductResult<ImportReport> {
        self.check_import_size(content.len())?;
        let rows = parse_csv(content)?;

        let mut report = ImportReport::default();
        for row in rows {
            let outcome = match row.command {
                Ok(command) => self.insert_new(command, actor).await,
                Err(err) => Err(err),
            };
            if let Err(err) = &outcome {
                tracing::debug!(row = row.row, error = %err, "Import row rejected");
            }
            report.record(row.row, &outcome);
        }

        tracing::info!(
            total_rows = report.total_rows,
            imported = report.imported,
            failed = report.failed,
            "CSV import finished"
        );
        Ok(report)
    }

    fn check_import_size(&self, len: usize) -> ProductResult<()> {
        if len > self.config.max_import_bytes {
            return Err(ProductError::PayloadTooLarge {
                limit: self.config.max_import_bytes,
            });
        }
        Ok(())
    }

    /// The full create path shared by the API and the importer.
    async fn insert_new(&self, input: CreateProduct, actor: Option<i64>) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;
        let draft = draft_from(input, actor, self.config.default_qty_alert, Utc::now())?;

        let mut tx = self.repository.begin().await?;
        check_create(&mut tx, &draft).await?;

        let ids = ReferenceIds::from(&draft);
        if let (Some(store), Some(warehouse)) = resolve_all(&mut tx, &ids, |_| true).await? {
            check_placement(&store, &warehouse)?;
        }

        let product = tx.insert(draft).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn set_status(&self, id: i64, status: ProductStatus) -> ProductResult<Product> {
        let mut tx = self.repository.begin().await?;
        let current = require_visible(id, tx.find_product(id).await?)?;

        let next_status = current
            .status
            .transition(status)
            .map_err(|e| ProductError::Internal(e.to_string()))?;
        let patch = ProductPatch {
            status: Some(next_status),
            ..Default::default()
        };
        let next = current.apply(&patch, Utc::now());

        let updated = tx.update(&next).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn project(&self, product: Product) -> ProductResult<ProductView> {
        let names = self
            .repository
            .display_names(&NameRequest::for_products([&product]))
            .await?;
        Ok(ProductView::assemble(product, &names))
    }

    async fn run_query(&self, query: ProductQuery) -> ProductResult<ProductPage> {
        let page = self.repository.search(&query).await?;
        let names = self
            .repository
            .display_names(&NameRequest::for_products(&page.items))
            .await?;
        Ok(page.map(|p| ProductView::assemble(p, &names)).into())
    }
}

/// Whether an update re-checks the reference of `kind`. Store and warehouse
/// are resolved together whenever either moves.
fn submitted(patch: &ProductPatch, kind: ReferenceKind) -> bool {
    match kind {
        ReferenceKind::Unit => patch.unit_id.is_some(),
        ReferenceKind::Category => patch.category_id.is_some(),
        ReferenceKind::SubCategory => patch.sub_category_id.is_some(),
        ReferenceKind::Brand => patch.brand_id.is_some(),
        ReferenceKind::Store | ReferenceKind::Warehouse => patch.touches_placement(),
    }
}
