use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn big_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn status<T: IntoIden>(col: T) -> ColumnDef {
    string_len(col, 20).default("active").to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(big_pk(Users::Id))
                    .col(string_len(Users::Name, 150))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(big_pk(Units::Id))
                    .col(string_len(Units::Name, 100))
                    .col(string_len(Units::ShortName, 20))
                    .col(status(Units::Status))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(big_pk(Categories::Id))
                    .col(string_len(Categories::Name, 150))
                    .col(status(Categories::Status))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubCategories::Table)
                    .if_not_exists()
                    .col(big_pk(SubCategories::Id))
                    .col(big_integer(SubCategories::CategoryId))
                    .col(string_len(SubCategories::Name, 150))
                    .col(status(SubCategories::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_categories_category_id")
                            .from(SubCategories::Table, SubCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(big_pk(Brands::Id))
                    .col(string_len(Brands::Name, 150))
                    .col(status(Brands::Status))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(big_pk(Warehouses::Id))
                    .col(string_len(Warehouses::Name, 150))
                    .col(status(Warehouses::Status))
                    .to_owned(),
            )
            .await?;

        // A store with a warehouse only stocks products of that warehouse
        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(big_pk(Stores::Id))
                    .col(string_len(Stores::Name, 150))
                    .col(big_integer_null(Stores::WarehouseId))
                    .col(status(Stores::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stores_warehouse_id")
                            .from(Stores::Table, Stores::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum Units {
    Table,
    Id,
    Name,
    ShortName,
    Status,
}

#[derive(DeriveIden)]
pub enum Categories {
    Table,
    Id,
    Name,
    Status,
}

#[derive(DeriveIden)]
pub enum SubCategories {
    Table,
    Id,
    CategoryId,
    Name,
    Status,
}

#[derive(DeriveIden)]
pub enum Brands {
    Table,
    Id,
    Name,
    Status,
}

#[derive(DeriveIden)]
pub enum Warehouses {
    Table,
    Id,
    Name,
    Status,
}

#[derive(DeriveIden)]
pub enum Stores {
    Table,
    Id,
    Name,
    WarehouseId,
    Status,
}
