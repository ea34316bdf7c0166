use uuid::Uuid;

use crate::{
  entity::{BillingInterval, LineItem, OrderStatus, order, order::LineItems},
  prelude::*,
  state::Plans,
};

#[derive(Debug, Clone, Default)]
pub struct NewOrder {
  pub user_id: Option<String>,
  pub customer_email: String,
  pub customer_name: Option<String>,
  pub customer_phone: Option<String>,
  pub items: Vec<LineItem>,
  pub plan: Option<BillingInterval>,
}

pub struct Order<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Order<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Opens a pending order with a fresh transaction id. Document purchases
  /// are priced from their items, subscription purchases from the plan table.
  pub async fn create(
    &self,
    new: NewOrder,
    plans: &Plans,
  ) -> Result<order::Model> {
    let email = new.customer_email.trim().to_string();
    if email.is_empty() {
      return Err(Error::MissingParam("customerEmail"));
    }

    let items = LineItems(new.items);
    let total_amount = match (new.plan, items.0.is_empty()) {
      (Some(plan), true) => {
        if new.user_id.is_none() {
          return Err(Error::Invalid("subscription orders need a user".into()));
        }
        plans.price(plan)
      }
      (None, false) => {
        if items.0.iter().any(|item| item.price < 0) {
          return Err(Error::Invalid("negative price".into()));
        }
        items
          .total()
          .ok_or_else(|| Error::Invalid("order total overflows".into()))?
      }
      (Some(_), false) => {
        return Err(Error::Invalid("order mixes a plan and items".into()));
      }
      (None, true) => {
        return Err(Error::Invalid("order has no items".into()));
      }
    };

    let order = order::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      transaction_id: Set(Uuid::new_v4().simple().to_string()),
      user_id: Set(new.user_id),
      customer_email: Set(email),
      customer_name: Set(new.customer_name),
      customer_phone: Set(new.customer_phone),
      items: Set(items),
      plan: Set(new.plan),
      total_amount: Set(total_amount),
      currency: Set(plans.currency.clone()),
      status: Set(OrderStatus::Pending),
      created_at: Set(utils::now()),
      paid_at: Set(None),
    };

    Ok(order.insert(self.db).await?)
  }

  pub async fn by_transaction(
    &self,
    transaction_id: &str,
  ) -> Result<Option<order::Model>> {
    let order = order::Entity::find()
      .filter(order::Column::TransactionId.eq(transaction_id))
      .one(self.db)
      .await?;
    Ok(order)
  }

  /// Whether a paid order of `email` contains `pdf_id`.
  pub async fn owns(&self, email: &str, pdf_id: &str) -> Result<bool> {
    let orders = order::Entity::find()
      .filter(order::Column::CustomerEmail.eq(email))
      .filter(order::Column::Status.eq(OrderStatus::Paid))
      .all(self.db)
      .await?;

    Ok(orders.iter().any(|order| order.items.contains(pdf_id)))
  }

  /// Applies a provider-verified status to the order.
  pub async fn settle(
    &self,
    order: order::Model,
    verified: OrderStatus,
  ) -> Result<order::Model> {
    let status = order.status.settle(verified);
    if status == order.status {
      return Ok(order);
    }

    let paid_at = match status {
      OrderStatus::Paid => Some(utils::now()),
      OrderStatus::Pending | OrderStatus::Failed => order.paid_at,
    };

    let order = order::ActiveModel {
      status: Set(status),
      paid_at: Set(paid_at),
      ..order.into()
    }
    .update(self.db)
    .await?;

    Ok(order)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;

  #[tokio::test]
  async fn document_orders_total_their_items() {
    let db = testing::db().await;

    let order = Order::new(&db)
      .create(
        NewOrder {
          customer_email: " awa@example.ci ".into(),
          items: vec![testing::item("doc1", 500), testing::item("doc2", 700)],
          ..Default::default()
        },
        &Plans::default(),
      )
      .await
      .unwrap();

    assert_eq!(order.customer_email, "awa@example.ci");
    assert_eq!(order.total_amount, 1200);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.transaction_id.len(), 32);
  }

  #[tokio::test]
  async fn plan_orders_use_plan_price() {
    let db = testing::db().await;
    let plans = Plans::default();

    let order = Order::new(&db)
      .create(
        NewOrder {
          user_id: Some("uid-1".into()),
          customer_email: "awa@example.ci".into(),
          plan: Some(BillingInterval::Semester),
          ..Default::default()
        },
        &plans,
      )
      .await
      .unwrap();

    assert_eq!(order.total_amount, plans.semester);
    assert_eq!(order.currency, "XOF");
  }

  #[tokio::test]
  async fn empty_orders_are_rejected() {
    let db = testing::db().await;
    let sv = Order::new(&db);

    let no_email = sv
      .create(
        NewOrder {
          items: vec![testing::item("doc1", 1)],
          ..Default::default()
        },
        &Plans::default(),
      )
      .await;
    assert!(matches!(no_email, Err(Error::MissingParam("customerEmail"))));

    let no_items = sv
      .create(
        NewOrder { customer_email: "a@b.c".into(), ..Default::default() },
        &Plans::default(),
      )
      .await;
    assert!(matches!(no_items, Err(Error::Invalid(_))));
  }

  #[tokio::test]
  async fn item_prices_are_validated() {
    let db = testing::db().await;
    let sv = Order::new(&db);

    let order = |items| NewOrder {
      customer_email: "awa@example.ci".into(),
      items,
      ..Default::default()
    };

    let negative = sv
      .create(order(vec![testing::item("doc1", -500)]), &Plans::default())
      .await;
    assert!(matches!(negative, Err(Error::Invalid(_))));

    let overflow = sv
      .create(
        order(vec![testing::item("doc1", i64::MAX), testing::item("doc2", 1)]),
        &Plans::default(),
      )
      .await;
    assert!(matches!(overflow, Err(Error::Invalid(_))));

    let count = order::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 0);
  }

  #[tokio::test]
  async fn only_paid_orders_grant_ownership() {
    let db = testing::db().await;
    let sv = Order::new(&db);

    let order =
      testing::order(&db, "awa@example.ci", &["doc123"], OrderStatus::Pending)
        .await;
    assert!(!sv.owns("awa@example.ci", "doc123").await.unwrap());

    sv.settle(order, OrderStatus::Paid).await.unwrap();

    assert!(sv.owns("awa@example.ci", "doc123").await.unwrap());
    assert!(!sv.owns("awa@example.ci", "doc456").await.unwrap());
    assert!(!sv.owns("other@example.ci", "doc123").await.unwrap());
  }

  #[tokio::test]
  async fn settle_stamps_payment_time_once() {
    let db = testing::db().await;
    let sv = Order::new(&db);

    let order =
      testing::order(&db, "awa@example.ci", &["doc1"], OrderStatus::Pending)
        .await;

    let paid = sv.settle(order, OrderStatus::Paid).await.unwrap();
    assert!(paid.paid_at.is_some());

    let again = sv.settle(paid.clone(), OrderStatus::Failed).await.unwrap();
    assert_eq!(again, paid);
  }
}
