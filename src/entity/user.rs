use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::subscription::SubscriptionStatus;

#[derive(
  Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
  #[sea_orm(string_value = "ADMIN")]
  #[serde(rename = "ADMIN")]
  Admin,
  #[default]
  #[sea_orm(string_value = "USER")]
  #[serde(rename = "USER")]
  User,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  /// Identifier issued by the authentication provider
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(unique)]
  pub email: String,
  pub display_name: Option<String>,
  pub role: Role,
  pub country: Option<String>,
  pub city: Option<String>,
  pub phone: Option<String>,
  /// Mapping to the Stripe customer, written by the webhook mirror
  pub stripe_customer_id: Option<String>,
  pub subscription_status: SubscriptionStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::subscription::Entity")]
  Subscriptions,
}

impl Related<super::subscription::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Subscriptions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
