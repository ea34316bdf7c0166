use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ArchivesPdf::Table)
          .if_not_exists()
          .col(ColumnDef::new(ArchivesPdf::Year).integer().not_null())
          .col(ColumnDef::new(ArchivesPdf::Id).string().not_null())
          .col(ColumnDef::new(ArchivesPdf::Filename).string().not_null())
          .col(ColumnDef::new(ArchivesPdf::Title).string().not_null())
          .col(ColumnDef::new(ArchivesPdf::IssueNumber).integer().null())
          .col(ColumnDef::new(ArchivesPdf::PublishedAt).date_time().not_null())
          .col(ColumnDef::new(ArchivesPdf::Description).text().null())
          .col(ColumnDef::new(ArchivesPdf::Tags).json().not_null())
          .col(ColumnDef::new(ArchivesPdf::CoverUrl).string().null())
          .col(ColumnDef::new(ArchivesPdf::AssetUrl).string().not_null())
          .col(
            ColumnDef::new(ArchivesPdf::SizeBytes)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(ArchivesPdf::Views)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(ArchivesPdf::Downloads)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(ArchivesPdf::CreatedAt).date_time().not_null())
          .primary_key(
            Index::create().col(ArchivesPdf::Year).col(ArchivesPdf::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_archives_year_published")
          .table(ArchivesPdf::Table)
          .col(ArchivesPdf::Year)
          .col(ArchivesPdf::PublishedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ArchivesPdf::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum ArchivesPdf {
  Table,
  Year,
  Id,
  Filename,
  Title,
  IssueNumber,
  PublishedAt,
  Description,
  Tags,
  CoverUrl,
  AssetUrl,
  SizeBytes,
  Views,
  Downloads,
  CreatedAt,
}
