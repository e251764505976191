use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::lifecycle::ProductStatus;
use crate::models::{
    BarcodeSymbology, DiscountType, NewProduct, Product, ProductType, SellingType, TaxType,
};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub item_code: Option<String>,
    pub barcode_symbology: Option<BarcodeSymbology>,
    pub barcode_value: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub quantity: i32,
    pub qty_alert: i32,
    pub discount_type: Option<DiscountType>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
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
    pub manufactured_date: Option<Date>,
    pub expired_date: Option<Date>,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id"
    )]
    Store,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// Conversion from Sea-ORM Model to domain Product
impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            sku: model.sku,
            item_code: model.item_code,
            barcode_symbology: model.barcode_symbology,
            barcode_value: model.barcode_value,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            qty_alert: model.qty_alert,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            unit_id: model.unit_id,
            category_id: model.category_id,
            sub_category_id: model.sub_category_id,
            brand_id: model.brand_id,
            store_id: model.store_id,
            warehouse_id: model.warehouse_id,
            selling_type: model.selling_type,
            product_type: model.product_type,
            tax_type: model.tax_type,
            manufacturer: model.manufacturer,
            manufactured_date: model.manufactured_date,
            expired_date: model.expired_date,
            image_url: model.image_url,
            status: model.status,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// Conversion from a draft to an insertable ActiveModel; the id is assigned
// by the database
impl From<NewProduct> for ActiveModel {
    fn from(draft: NewProduct) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(draft.name),
            slug: Set(draft.slug),
            sku: Set(draft.sku),
            item_code: Set(draft.item_code),
            barcode_symbology: Set(draft.barcode_symbology),
            barcode_value: Set(draft.barcode_value),
            description: Set(draft.description),
            price: Set(draft.price),
            quantity: Set(draft.quantity),
            qty_alert: Set(draft.qty_alert),
            discount_type: Set(draft.discount_type),
            discount_value: Set(draft.discount_value),
            unit_id: Set(draft.unit_id),
            category_id: Set(draft.category_id),
            sub_category_id: Set(draft.sub_category_id),
            brand_id: Set(draft.brand_id),
            store_id: Set(draft.store_id),
            warehouse_id: Set(draft.warehouse_id),
            selling_type: Set(draft.selling_type),
            product_type: Set(draft.product_type),
            tax_type: Set(draft.tax_type),
            manufacturer: Set(draft.manufacturer),
            manufactured_date: Set(draft.manufactured_date),
            expired_date: Set(draft.expired_date),
            image_url: Set(draft.image_url),
            status: Set(draft.status),
            created_by: Set(draft.created_by),
            created_at: Set(draft.created_at),
            updated_at: Set(draft.created_at),
        }
    }
}

// Full overwrite of an existing row. created_by and created_at never change.
impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        ActiveModel {
            id: Set(product.id),
            name: Set(product.name.clone()),
            slug: Set(product.slug.clone()),
            sku: Set(product.sku.clone()),
            item_code: Set(product.item_code.clone()),
            barcode_symbology: Set(product.barcode_symbology),
            barcode_value: Set(product.barcode_value.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            quantity: Set(product.quantity),
            qty_alert: Set(product.qty_alert),
            discount_type: Set(product.discount_type),
            discount_value: Set(product.discount_value),
            unit_id: Set(product.unit_id),
            category_id: Set(product.category_id),
            sub_category_id: Set(product.sub_category_id),
            brand_id: Set(product.brand_id),
            store_id: Set(product.store_id),
            warehouse_id: Set(product.warehouse_id),
            selling_type: Set(product.selling_type),
            product_type: Set(product.product_type),
            tax_type: Set(product.tax_type),
            manufacturer: Set(product.manufacturer.clone()),
            manufactured_date: Set(product.manufactured_date),
            expired_date: Set(product.expired_date),
            image_url: Set(product.image_url.clone()),
            status: Set(product.status),
            created_by: NotSet,
            created_at: NotSet,
            updated_at: Set(product.updated_at),
        }
    }
}
