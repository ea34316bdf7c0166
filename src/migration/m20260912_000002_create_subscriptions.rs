use sea_orm_migration::prelude::*;

use super::m20260912_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Subscriptions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Subscriptions::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(Subscriptions::UserId).string().not_null())
          .col(
            ColumnDef::new(Subscriptions::Status)
              .string()
              .not_null()
              .default("inactive"),
          )
          .col(
            ColumnDef::new(Subscriptions::Amount)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Subscriptions::Interval).string().not_null())
          .col(ColumnDef::new(Subscriptions::Currency).string().not_null())
          .col(ColumnDef::new(Subscriptions::PaymentMethod).string().not_null())
          .col(
            ColumnDef::new(Subscriptions::CurrentPeriodStart)
              .date_time()
              .null(),
          )
          .col(
            ColumnDef::new(Subscriptions::CurrentPeriodEnd).date_time().null(),
          )
          .col(
            ColumnDef::new(Subscriptions::CancelAtPeriodEnd)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Subscriptions::CanceledAt).date_time().null())
          .col(
            ColumnDef::new(Subscriptions::ProviderSubscriptionId)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(Subscriptions::ProviderCustomerId).string().null(),
          )
          .col(ColumnDef::new(Subscriptions::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Subscriptions::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_subscriptions_user")
              .from(Subscriptions::Table, Subscriptions::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_subscriptions_user")
          .table(Subscriptions::Table)
          .col(Subscriptions::UserId)
          .col(Subscriptions::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Subscriptions {
  Table,
  Id,
  UserId,
  Status,
  Amount,
  Interval,
  Currency,
  PaymentMethod,
  CurrentPeriodStart,
  CurrentPeriodEnd,
  CancelAtPeriodEnd,
  CanceledAt,
  ProviderSubscriptionId,
  ProviderCustomerId,
  CreatedAt,
  UpdatedAt,
}
