use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Users::DisplayName).string().null())
          .col(ColumnDef::new(Users::Role).string().not_null().default("USER"))
          .col(ColumnDef::new(Users::Country).string().null())
          .col(ColumnDef::new(Users::City).string().null())
          .col(ColumnDef::new(Users::Phone).string().null())
          .col(ColumnDef::new(Users::StripeCustomerId).string().null())
          .col(
            ColumnDef::new(Users::SubscriptionStatus)
              .string()
              .not_null()
              .default("inactive"),
          )
          .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_users_stripe_customer")
          .table(Users::Table)
          .col(Users::StripeCustomerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  Email,
  DisplayName,
  Role,
  Country,
  City,
  Phone,
  StripeCustomerId,
  SubscriptionStatus,
  CreatedAt,
}
