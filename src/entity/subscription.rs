use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum,
  Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "trialing")]
  Trialing,
  #[sea_orm(string_value = "canceled")]
  Canceled,
  #[sea_orm(string_value = "past_due")]
  PastDue,
  #[default]
  #[sea_orm(string_value = "inactive")]
  Inactive,
}

impl SubscriptionStatus {
  /// Statuses that open the reader.
  pub const GRANTING: [SubscriptionStatus; 2] =
    [SubscriptionStatus::Active, SubscriptionStatus::Trialing];

  pub fn grants_access(self) -> bool {
    match self {
      Self::Active | Self::Trialing => true,
      Self::Canceled | Self::PastDue | Self::Inactive => false,
    }
  }

  /// Normalizes Stripe's subscription status vocabulary.
  pub fn from_stripe(status: &str) -> Self {
    match status {
      "active" => Self::Active,
      "trialing" => Self::Trialing,
      "canceled" => Self::Canceled,
      "past_due" | "unpaid" => Self::PastDue,
      _ => Self::Inactive,
    }
  }
}

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
  #[sea_orm(string_value = "month")]
  Month,
  #[sea_orm(string_value = "semester")]
  Semester,
  #[sea_orm(string_value = "year")]
  Year,
}

impl BillingInterval {
  pub fn months(self) -> u32 {
    match self {
      Self::Month => 1,
      Self::Semester => 6,
      Self::Year => 12,
    }
  }

  /// Maps a Stripe `recurring` block onto the local intervals.
  pub fn from_stripe(interval: &str, count: u32) -> Self {
    match (interval, count) {
      ("year", _) => Self::Year,
      ("month", 6) => Self::Semester,
      ("month", 12) => Self::Year,
      _ => Self::Month,
    }
  }
}

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  #[sea_orm(string_value = "stripe")]
  Stripe,
  #[sea_orm(string_value = "cinetpay")]
  Cinetpay,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub user_id: String,
  pub status: SubscriptionStatus,
  /// Amount in the currency's minor unit
  pub amount: i64,
  pub interval: BillingInterval,
  pub currency: String,
  pub payment_method: PaymentMethod,
  pub current_period_start: Option<DateTime>,
  pub current_period_end: Option<DateTime>,
  pub cancel_at_period_end: bool,
  pub canceled_at: Option<DateTime>,
  #[sea_orm(unique)]
  pub provider_subscription_id: String,
  pub provider_customer_id: Option<String>,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
  use sea_orm::Iterable;

  use super::*;

  #[test]
  fn stripe_statuses_are_normalized() {
    use SubscriptionStatus as Status;

    assert_eq!(Status::from_stripe("active"), Status::Active);
    assert_eq!(Status::from_stripe("unpaid"), Status::PastDue);
    assert_eq!(Status::from_stripe("incomplete_expired"), Status::Inactive);
    assert_eq!(Status::from_stripe("paused"), Status::Inactive);
    assert_eq!(Status::from_stripe(""), Status::Inactive);
  }

  #[test]
  fn only_active_and_trialing_grant_access() {
    for status in SubscriptionStatus::iter() {
      assert_eq!(
        status.grants_access(),
        SubscriptionStatus::GRANTING.contains(&status)
      );
    }
  }

  #[test]
  fn six_month_plans_are_semesters() {
    use BillingInterval as Interval;

    assert_eq!(Interval::from_stripe("month", 6), Interval::Semester);
    assert_eq!(Interval::from_stripe("month", 1), Interval::Month);
    assert_eq!(Interval::from_stripe("year", 1), Interval::Year);
    assert_eq!(Interval::from_stripe("week", 2), Interval::Month);
  }
}
