//! Create group table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Group::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Group::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Group::Slug).string_len(100).not_null())
                    .col(ColumnDef::new(Group::Description).text().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_group_slug")
                    .table(Group::Table)
                    .col(Group::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Group::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
    Title,
    Slug,
    Description,
}
