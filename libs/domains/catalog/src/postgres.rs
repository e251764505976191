use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
    TransactionTrait,
};

use crate::{
    entity::{brand, category, product, store, sub_category, unit, user, warehouse},
    error::{ProductError, ProductResult},
    models::{NewProduct, Product},
    projection::{DisplayNames, NameRequest},
    query::{Page, Predicate, ProductQuery, SortDirection, SortField},
    repository::{ProductRepository, ProductTransaction},
    resolver::{Reference, ReferenceKind, ReferenceResolver},
    uniqueness::{KeyLookup, UniqueKey},
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub struct PgTransaction {
    txn: DatabaseTransaction,
}

/// Escape LIKE wildcards so user input matches literally.
fn like_contains(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn lower_like(column: product::Column, pattern: &str) -> Condition {
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col((product::Entity, column))))
            .like(LikeExpr::new(pattern).escape('\\')),
    )
}

fn predicate_condition(predicate: &Predicate) -> Condition {
    use product::Column;

    let all = Condition::all();
    match predicate {
        Predicate::Nothing => all.add(Expr::val(1).eq(0)),
        Predicate::Visible => all.add(Column::Status.ne(crate::lifecycle::ProductStatus::Deleted)),
        Predicate::StatusIs(status) => all.add(Column::Status.eq(*status)),
        Predicate::CategoryId(id) => all.add(Column::CategoryId.eq(*id)),
        Predicate::BrandId(id) => all.add(Column::BrandId.eq(*id)),
        Predicate::UnitId(id) => all.add(Column::UnitId.eq(*id)),
        Predicate::SubCategoryId(id) => all.add(Column::SubCategoryId.eq(*id)),
        Predicate::StoreId(id) => all.add(Column::StoreId.eq(*id)),
        Predicate::WarehouseId(id) => all.add(Column::WarehouseId.eq(*id)),
        Predicate::ProductType(kind) => all.add(Column::ProductType.eq(*kind)),
        Predicate::SellingType(kind) => all.add(Column::SellingType.eq(*kind)),
        Predicate::Search(needle) => {
            let pattern = like_contains(needle);
            Condition::any()
                .add(lower_like(Column::Name, &pattern))
                .add(lower_like(Column::Sku, &pattern))
                .add(lower_like(Column::ItemCode, &pattern))
        }
        Predicate::LowStock { threshold: Some(threshold) } => {
            all.add(Column::Quantity.lte(*threshold))
        }
        Predicate::LowStock { threshold: None } => {
            all.add(
                Expr::col((product::Entity, Column::Quantity))
                    .lte(Expr::col((product::Entity, Column::QtyAlert))),
            )
        }
        Predicate::ExpiredOn(day) => all
            .add(Column::ExpiredDate.is_not_null())
            .add(Column::ExpiredDate.lte(*day)),
    }
}

fn sort_column(field: SortField) -> product::Column {
    use product::Column;

    match field {
        SortField::Id => Column::Id,
        SortField::Name => Column::Name,
        SortField::Sku => Column::Sku,
        SortField::Slug => Column::Slug,
        SortField::Price => Column::Price,
        SortField::Quantity => Column::Quantity,
        SortField::QtyAlert => Column::QtyAlert,
        SortField::Status => Column::Status,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
        SortField::ExpiredDate => Column::ExpiredDate,
        SortField::ManufacturedDate => Column::ManufacturedDate,
    }
}

/// Render a product query as one filtered, ordered select.
fn select(query: &ProductQuery) -> Select<product::Entity> {
    let condition = query
        .predicates
        .iter()
        .fold(Condition::all(), |acc, p| acc.add(predicate_condition(p)));

    let order = match query.sort.direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };

    product::Entity::find()
        .filter(condition)
        .order_by(sort_column(query.sort.field), order)
        .order_by_asc(product::Column::Id)
}

/// `select` restricted to the requested page.
fn page_select(query: &ProductQuery) -> Select<product::Entity> {
    select(query)
        .offset(query.page.offset())
        .limit(query.page.size)
}

/// Which unique index a violation message names, if any.
fn violated_key(detail: &str) -> Option<UniqueKey> {
    [UniqueKey::Sku, UniqueKey::Slug, UniqueKey::ItemCode]
        .into_iter()
        .find(|key| detail.contains(key.constraint()))
}

/// Map unique index violations back to `DuplicateKey`; anything else is a
/// database failure.
fn write_error(err: DbErr, sku: &str, slug: &str, item_code: Option<&str>) -> ProductError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        if let Some(key) = violated_key(&detail) {
            let value = match key {
                UniqueKey::Sku => sku,
                UniqueKey::Slug => slug,
                UniqueKey::ItemCode => item_code.unwrap_or_default(),
            };
            tracing::warn!(key = key.as_str(), %value, "Unique index rejected concurrent write");
            return key.duplicate(value);
        }
    }
    ProductError::Database(err.to_string())
}

#[async_trait]
impl ReferenceResolver for PgTransaction {
    async fn find_reference(
        &mut self,
        kind: ReferenceKind,
        id: i64,
    ) -> ProductResult<Option<Reference>> {
        let txn = &self.txn;
        let reference = match kind {
            ReferenceKind::Unit => unit::Entity::find_by_id(id)
                .one(txn)
                .await?
                .map(|m| Reference::new(kind, m.id, m.short_name).with_status(m.status)),
            ReferenceKind::Category => category::Entity::find_by_id(id)
                .one(txn)
                .await?
                .map(|m| Reference::new(kind, m.id, m.name).with_status(m.status)),
            ReferenceKind::SubCategory => sub_category::Entity::find_by_id(id)
                .one(txn)
                .await?
                .map(|m| Reference::new(kind, m.id, m.name).with_status(m.status)),
            ReferenceKind::Brand => brand::Entity::find_by_id(id)
                .one(txn)
                .await?
                .map(|m| Reference::new(kind, m.id, m.name).with_status(m.status)),
            ReferenceKind::Store => store::Entity::find_by_id(id).one(txn).await?.map(|m| {
                let reference = Reference::new(kind, m.id, m.name).with_status(m.status);
                match m.warehouse_id {
                    Some(warehouse_id) => reference.pinned_to(warehouse_id),
                    None => reference,
                }
            }),
            ReferenceKind::Warehouse => warehouse::Entity::find_by_id(id)
                .one(txn)
                .await?
                .map(|m| Reference::new(kind, m.id, m.name).with_status(m.status)),
        };
        Ok(reference)
    }
}

#[async_trait]
impl KeyLookup for PgTransaction {
    async fn key_taken(
        &mut self,
        key: UniqueKey,
        value: &str,
        exclude: Option<i64>,
    ) -> ProductResult<bool> {
        let column = match key {
            UniqueKey::Sku => product::Column::Sku,
            UniqueKey::Slug => product::Column::Slug,
            UniqueKey::ItemCode => product::Column::ItemCode,
        };

        let mut query = product::Entity::find().filter(column.eq(value));
        if let Some(id) = exclude {
            query = query.filter(product::Column::Id.ne(id));
        }

        Ok(query.count(&self.txn).await? > 0)
    }
}

#[async_trait]
impl ProductTransaction for PgTransaction {
    async fn find_product(&mut self, id: i64) -> ProductResult<Option<Product>> {
        let model = product::Entity::find_by_id(id).one(&self.txn).await?;
        Ok(model.map(Into::into))
    }

    async fn insert(&mut self, draft: NewProduct) -> ProductResult<Product> {
        let (sku, slug, item_code) = (draft.sku.clone(), draft.slug.clone(), draft.item_code.clone());
        let active_model: product::ActiveModel = draft.into();

        let model = active_model
            .insert(&self.txn)
            .await
            .map_err(|e| write_error(e, &sku, &slug, item_code.as_deref()))?;

        tracing::info!(product_id = %model.id, "Inserted product");
        Ok(model.into())
    }

    async fn update(&mut self, product: &Product) -> ProductResult<Product> {
        let active_model = product::ActiveModel::from(product);

        let model = active_model.update(&self.txn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ProductError::NotFound(product.id),
            other => write_error(
                other,
                &product.sku,
                &product.slug,
                product.item_code.as_deref(),
            ),
        })?;

        tracing::info!(product_id = %model.id, "Updated product");
        Ok(model.into())
    }

    async fn commit(self) -> ProductResult<()> {
        self.txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    type Tx = PgTransaction;

    async fn begin(&self) -> ProductResult<Self::Tx> {
        let txn = self.db.begin().await?;
        Ok(PgTransaction { txn })
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ProductError::Database(e.to_string()))?;

        Ok(model.map(Into::into))
    }

    async fn search(&self, query: &ProductQuery) -> ProductResult<Page<Product>> {
        if query.is_empty_by_construction() {
            return Ok(Page::empty(query.page));
        }

        let total_items = select(query).count(&self.db).await?;
        let models = page_select(query).all(&self.db).await?;

        Ok(Page {
            items: models.into_iter().map(Into::into).collect(),
            index: query.page.index,
            size: query.page.size,
            total_items,
        })
    }

    async fn display_names(&self, request: &NameRequest) -> ProductResult<DisplayNames> {
        let mut names = DisplayNames::default();
        if request.is_empty() {
            return Ok(names);
        }

        let ids = request.ids(ReferenceKind::Unit);
        if !ids.is_empty() {
            for m in unit::Entity::find()
                .filter(unit::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert(ReferenceKind::Unit, m.id, m.short_name);
            }
        }

        let ids = request.ids(ReferenceKind::Category);
        if !ids.is_empty() {
            for m in category::Entity::find()
                .filter(category::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert(ReferenceKind::Category, m.id, m.name);
            }
        }

        let ids = request.ids(ReferenceKind::SubCategory);
        if !ids.is_empty() {
            for m in sub_category::Entity::find()
                .filter(sub_category::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert(ReferenceKind::SubCategory, m.id, m.name);
            }
        }

        let ids = request.ids(ReferenceKind::Brand);
        if !ids.is_empty() {
            for m in brand::Entity::find()
                .filter(brand::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert(ReferenceKind::Brand, m.id, m.name);
            }
        }

        let ids = request.ids(ReferenceKind::Store);
        if !ids.is_empty() {
            for m in store::Entity::find()
                .filter(store::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert(ReferenceKind::Store, m.id, m.name);
            }
        }

        let ids = request.ids(ReferenceKind::Warehouse);
        if !ids.is_empty() {
            for m in warehouse::Entity::find()
                .filter(warehouse::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert(ReferenceKind::Warehouse, m.id, m.name);
            }
        }

        if !request.users.is_empty() {
            let ids: Vec<i64> = request.users.iter().copied().collect();
            for m in user::Entity::find()
                .filter(user::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
            {
                names.insert_user(m.id, m.name);
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_product;
    use crate::lifecycle::ProductStatus;
    use crate::models::ProductListParams;
    use crate::query::{PageRequest, Sort};
    use sea_orm::{DbBackend, MockDatabase, QueryTrait, Value};
    use std::collections::BTreeMap;

    fn sql(query: &ProductQuery) -> String {
        select(query).build(DbBackend::Postgres).to_string()
    }

    fn model() -> product::Model {
        let p = sample_product();
        product::Model {
            id: p.id,
            name: p.name,
            slug: p.slug,
            sku: p.sku,
            item_code: p.item_code,
            barcode_symbology: p.barcode_symbology,
            barcode_value: p.barcode_value,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
            qty_alert: p.qty_alert,
            discount_type: p.discount_type,
            discount_value: p.discount_value,
            unit_id: p.unit_id,
            category_id: p.category_id,
            sub_category_id: p.sub_category_id,
            brand_id: p.brand_id,
            store_id: p.store_id,
            warehouse_id: p.warehouse_id,
            selling_type: p.selling_type,
            product_type: p.product_type,
            tax_type: p.tax_type,
            manufacturer: p.manufacturer,
            manufactured_date: p.manufactured_date,
            expired_date: p.expired_date,
            image_url: p.image_url,
            status: p.status,
            created_by: p.created_by,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }

    #[test]
    fn test_default_listing_sql_excludes_deleted_and_orders_by_id_last() {
        let query = ProductQuery::list(&ProductListParams::default(), 100).unwrap();
        let sql = sql(&query);

        assert!(sql.contains(r#""products"."status" <> 'DELETED'"#), "{sql}");
        assert!(
            sql.contains(r#"ORDER BY "products"."created_at" DESC, "products"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn test_search_sql_is_lowercased_and_escaped() {
        let params = ProductListParams {
            search: Some("50%_OFF".into()),
            ..Default::default()
        };
        let sql = sql(&ProductQuery::list(&params, 100).unwrap());

        assert!(sql.contains(r#"LOWER("products"."name") LIKE"#), "{sql}");
        assert!(sql.contains(r#"LOWER("products"."item_code") LIKE"#), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains("off"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn test_low_stock_sql_compares_columns() {
        let query = ProductQuery {
            predicates: vec![Predicate::Visible, Predicate::LowStock { threshold: None }],
            sort: Sort::new(SortField::Quantity, SortDirection::Asc),
            page: PageRequest { index: 0, size: 10 },
        };
        let sql = sql(&query);
        assert!(
            sql.contains(r#""products"."quantity" <= "products"."qty_alert""#),
            "{sql}"
        );
    }

    #[test]
    fn test_exact_filters_are_anded() {
        let params = ProductListParams {
            category_id: Some(3),
            warehouse_id: Some(4),
            status: Some("inactive".into()),
            ..Default::default()
        };
        let sql = sql(&ProductQuery::list(&params, 100).unwrap());

        assert!(sql.contains(r#""products"."status" = 'inactive'"#), "{sql}");
        assert!(sql.contains(r#""products"."category_id" = 3"#), "{sql}");
        assert!(sql.contains(r#""products"."warehouse_id" = 4"#), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[test]
    fn test_page_select_uses_the_shared_offset() {
        let params = ProductListParams {
            page: Some(3),
            size: Some(20),
            ..Default::default()
        };
        let query = ProductQuery::list(&params, 100).unwrap();
        let sql = page_select(&query).build(DbBackend::Postgres).to_string();

        assert!(sql.contains("LIMIT 20"), "{sql}");
        assert!(sql.contains("OFFSET 60"), "{sql}");
    }

    #[test]
    fn test_page_beyond_offset_range_never_reaches_the_database() {
        let params = ProductListParams {
            page: Some(u64::MAX / 2),
            ..Default::default()
        };
        let err = ProductQuery::list(&params, 100).unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_search_on_the_last_addressable_page_is_empty() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([[BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(1)),
            )])]])
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let params = ProductListParams {
            page: Some((i64::MAX as u64) / 10),
            size: Some(10),
            ..Default::default()
        };
        let page = repo
            .search(&ProductQuery::list(&params, 100).unwrap())
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
    }

    #[test]
    fn test_violated_key_from_postgres_detail() {
        let detail = r#"duplicate key value violates unique constraint "uq_products_slug""#;
        assert_eq!(violated_key(detail), Some(UniqueKey::Slug));
        assert_eq!(violated_key("violates unique constraint \"products_pkey\""), None);
    }

    #[test]
    fn test_like_contains_escapes_wildcards() {
        assert_eq!(like_contains("a%b_c\\"), r"%a\%b\_c\\%");
    }

    #[tokio::test]
    async fn test_get_by_id_maps_model() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![model()]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(product.sku, "SKU1");
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn test_empty_by_construction_skips_database() {
        let db = MockDatabase::new(DbBackend::Postgres).into_connection();
        let repo = PgProductRepository::new(db);

        let params = ProductListParams {
            status: Some("DELETED".into()),
            ..Default::default()
        };
        let page = repo
            .search(&ProductQuery::list(&params, 100).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }
}
