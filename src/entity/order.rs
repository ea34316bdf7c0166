use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

use super::subscription::BillingInterval;

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "failed")]
  Failed,
}

impl OrderStatus {
  /// Next status once the provider confirmed `verified`. Paid is final.
  pub fn settle(self, verified: OrderStatus) -> OrderStatus {
    match self {
      Self::Paid => Self::Paid,
      Self::Pending | Self::Failed => verified,
    }
  }
}

/// One purchased archive document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  /// Archive document id
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub cover_url: Option<String>,
  #[serde(default)]
  pub asset_url: Option<String>,
  pub price: i64,
  pub year: i32,
}

#[derive(
  Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
  FromJsonQueryResult,
)]
pub struct LineItems(pub Vec<LineItem>);

impl LineItems {
  pub fn contains(&self, pdf_id: &str) -> bool {
    self.0.iter().any(|item| item.id == pdf_id)
  }

  /// Sum of the item prices, `None` when it does not fit an `i64`.
  pub fn total(&self) -> Option<i64> {
    self.0.iter().try_fold(0i64, |total, item| total.checked_add(item.price))
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  /// Correlation id shared with the payment provider
  #[sea_orm(unique)]
  pub transaction_id: String,
  pub user_id: Option<String>,
  pub customer_email: String,
  pub customer_name: Option<String>,
  pub customer_phone: Option<String>,
  #[sea_orm(column_type = "Json")]
  pub items: LineItems,
  /// Set for subscription purchases, empty for one-time document purchases
  pub plan: Option<BillingInterval>,
  pub total_amount: i64,
  pub currency: String,
  pub status: OrderStatus,
  pub created_at: DateTime,
  pub paid_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, price: i64) -> LineItem {
    LineItem {
      id: id.into(),
      title: format!("Afrikipresse {id}"),
      cover_url: None,
      asset_url: None,
      price,
      year: 2024,
    }
  }

  #[test]
  fn line_items_lookup_and_total() {
    let items = LineItems(vec![item("doc123", 500), item("doc456", 700)]);

    assert!(items.contains("doc123"));
    assert!(!items.contains("doc789"));
    assert_eq!(items.total(), Some(1200));
  }

  #[test]
  fn overflowing_total_is_none() {
    let items = LineItems(vec![item("doc123", i64::MAX), item("doc456", 1)]);
    assert_eq!(items.total(), None);
  }

  #[test]
  fn paid_orders_are_never_downgraded() {
    use OrderStatus::*;

    assert_eq!(Paid.settle(Failed), Paid);
    assert_eq!(Paid.settle(Pending), Paid);
    assert_eq!(Pending.settle(Paid), Paid);
    assert_eq!(Pending.settle(Failed), Failed);
    assert_eq!(Failed.settle(Paid), Paid);
  }

  #[test]
  fn line_items_read_camel_case() {
    let raw = json::json!([{
      "id": "doc123",
      "title": "N° 1024",
      "coverUrl": "https://cdn/cover.jpg",
      "price": 500,
      "year": 2023
    }]);

    let items: Vec<LineItem> = json::from_value(raw).unwrap();
    assert_eq!(items[0].cover_url.as_deref(), Some("https://cdn/cover.jpg"));
    assert_eq!(items[0].asset_url, None);
  }
}
