use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_catalog_tables::{Products, Suppliers, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupplierPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupplierPrices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SupplierPrices::ProductId).integer().not_null())
                    .col(ColumnDef::new(SupplierPrices::SupplierId).integer().not_null())
                    .col(ColumnDef::new(SupplierPrices::UnitPrice).double().not_null())
                    .col(
                        ColumnDef::new(SupplierPrices::MinQuantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(SupplierPrices::DeliveryDays).integer().null())
                    .col(ColumnDef::new(SupplierPrices::ValidFrom).date().not_null())
                    .col(ColumnDef::new(SupplierPrices::ValidUntil).date().null())
                    .col(ColumnDef::new(SupplierPrices::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(SupplierPrices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_prices_product")
                            .from(SupplierPrices::Table, SupplierPrices::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_prices_supplier")
                            .from(SupplierPrices::Table, SupplierPrices::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_supplier_prices_product_supplier")
                    .table(SupplierPrices::Table)
                    .col(SupplierPrices::ProductId)
                    .col(SupplierPrices::SupplierId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupplierReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupplierReviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SupplierReviews::SupplierId).integer().not_null())
                    .col(ColumnDef::new(SupplierReviews::ProductId).integer().null())
                    .col(ColumnDef::new(SupplierReviews::QualityScore).integer().null())
                    .col(ColumnDef::new(SupplierReviews::PriceScore).integer().null())
                    .col(ColumnDef::new(SupplierReviews::DeliveryScore).integer().null())
                    .col(ColumnDef::new(SupplierReviews::ServiceScore).integer().null())
                    .col(ColumnDef::new(SupplierReviews::OverallScore).double().not_null())
                    .col(ColumnDef::new(SupplierReviews::Comments).text().null())
                    .col(ColumnDef::new(SupplierReviews::ReviewedBy).integer().null())
                    .col(ColumnDef::new(SupplierReviews::ReviewedOn).date().not_null())
                    .col(
                        ColumnDef::new(SupplierReviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_reviews_supplier")
                            .from(SupplierReviews::Table, SupplierReviews::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_reviews_product")
                            .from(SupplierReviews::Table, SupplierReviews::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_reviews_user")
                            .from(SupplierReviews::Table, SupplierReviews::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupplierReviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupplierPrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SupplierPrices {
    Table,
    Id,
    ProductId,
    SupplierId,
    UnitPrice,
    MinQuantity,
    DeliveryDays,
    ValidFrom,
    ValidUntil,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SupplierReviews {
    Table,
    Id,
    SupplierId,
    ProductId,
    QualityScore,
    PriceScore,
    DeliveryScore,
    ServiceScore,
    OverallScore,
    Comments,
    ReviewedBy,
    ReviewedOn,
    CreatedAt,
}
