use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260101_000000_create_reference_tables::{
    Brands, Categories, Stores, SubCategories, Units, Users, Warehouses,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

// The catalog maps violations of these back to "already in use" errors by name.
const UQ_PRODUCTS_SKU: &str = "uq_products_sku";
const UQ_PRODUCTS_SLUG: &str = "uq_products_slug";
const UQ_PRODUCTS_ITEM_CODE: &str = "uq_products_item_code";

fn reference(name: &str, col: Products, table: impl IntoIden, id: impl IntoIden) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(Products::Table, col)
        .to(table, id)
        .on_delete(ForeignKeyAction::Restrict)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Products::Name, 150))
                    .col(string_len(Products::Slug, 150))
                    .col(string_len(Products::Sku, 64))
                    .col(string_len_null(Products::ItemCode, 64))
                    .col(string_len_null(Products::BarcodeSymbology, 20))
                    .col(string_len_null(Products::BarcodeValue, 128))
                    .col(text_null(Products::Description))
                    .col(decimal_len(Products::Price, 10, 2))
                    .col(integer(Products::Quantity).default(0))
                    .col(integer(Products::QtyAlert).default(10))
                    .col(string_len_null(Products::DiscountType, 20))
                    .col(decimal_len(Products::DiscountValue, 10, 2).default(0))
                    .col(big_integer(Products::UnitId))
                    .col(big_integer(Products::CategoryId))
                    .col(big_integer(Products::SubCategoryId))
                    .col(big_integer(Products::BrandId))
                    .col(big_integer(Products::StoreId))
                    .col(big_integer(Products::WarehouseId))
                    .col(string_len_null(Products::SellingType, 20))
                    .col(string_len(Products::ProductType, 20).default("single"))
                    .col(string_len_null(Products::TaxType, 20))
                    .col(string_len_null(Products::Manufacturer, 150))
                    .col(date_null(Products::ManufacturedDate))
                    .col(date_null(Products::ExpiredDate))
                    .col(string_len_null(Products::ImageUrl, 500))
                    .col(string_len(Products::Status, 20).default("active"))
                    .col(big_integer_null(Products::CreatedBy))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut reference(
                        "fk_products_unit_id",
                        Products::UnitId,
                        Units::Table,
                        Units::Id,
                    ))
                    .foreign_key(&mut reference(
                        "fk_products_category_id",
                        Products::CategoryId,
                        Categories::Table,
                        Categories::Id,
                    ))
                    .foreign_key(&mut reference(
                        "fk_products_sub_category_id",
                        Products::SubCategoryId,
                        SubCategories::Table,
                        SubCategories::Id,
                    ))
                    .foreign_key(&mut reference(
                        "fk_products_brand_id",
                        Products::BrandId,
                        Brands::Table,
                        Brands::Id,
                    ))
                    .foreign_key(&mut reference(
                        "fk_products_store_id",
                        Products::StoreId,
                        Stores::Table,
                        Stores::Id,
                    ))
                    .foreign_key(&mut reference(
                        "fk_products_warehouse_id",
                        Products::WarehouseId,
                        Warehouses::Table,
                        Warehouses::Id,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_created_by")
                            .from(Products::Table, Products::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique keys. Soft-deleted rows keep theirs.
        for (name, col) in [
            (UQ_PRODUCTS_SKU, Products::Sku),
            (UQ_PRODUCTS_SLUG, Products::Slug),
            (UQ_PRODUCTS_ITEM_CODE, Products::ItemCode),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        for (name, col) in [
            ("idx_products_status", Products::Status),
            ("idx_products_category_id", Products::CategoryId),
            ("idx_products_brand_id", Products::BrandId),
            ("idx_products_store_id", Products::StoreId),
            ("idx_products_warehouse_id", Products::WarehouseId),
            ("idx_products_expired_date", Products::ExpiredDate),
            ("idx_products_created_at", Products::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Products {
    Table,
    Id,
    Name,
    Slug,
    Sku,
    ItemCode,
    BarcodeSymbology,
    BarcodeValue,
    Description,
    Price,
    Quantity,
    QtyAlert,
    DiscountType,
    DiscountValue,
    UnitId,
    CategoryId,
    SubCategoryId,
    BrandId,
    StoreId,
    WarehouseId,
    SellingType,
    ProductType,
    TaxType,
    Manufacturer,
    ManufacturedDate,
    ExpiredDate,
    ImageUrl,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
