use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Orders::Table)
          .if_not_exists()
          .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
          .col(
            ColumnDef::new(Orders::TransactionId)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Orders::UserId).string().null())
          .col(ColumnDef::new(Orders::CustomerEmail).string().not_null())
          .col(ColumnDef::new(Orders::CustomerName).string().null())
          .col(ColumnDef::new(Orders::CustomerPhone).string().null())
          .col(ColumnDef::new(Orders::Items).json().not_null())
          .col(ColumnDef::new(Orders::Plan).string().null())
          .col(ColumnDef::new(Orders::TotalAmount).big_integer().not_null())
          .col(ColumnDef::new(Orders::Currency).string().not_null())
          .col(
            ColumnDef::new(Orders::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Orders::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Orders::PaidAt).date_time().null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_orders_customer_status")
          .table(Orders::Table)
          .col(Orders::CustomerEmail)
          .col(Orders::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Orders {
  Table,
  Id,
  TransactionId,
  UserId,
  CustomerEmail,
  CustomerName,
  CustomerPhone,
  Items,
  Plan,
  TotalAmount,
  Currency,
  Status,
  CreatedAt,
  PaidAt,
}
