use uuid::Uuid;

use crate::{
  entity::{BillingInterval, PaymentMethod, SubscriptionStatus, subscription},
  prelude::*,
};

/// Provider-side view of a subscription, mirrored into the store.
#[derive(Debug, Clone)]
pub struct Mirror {
  pub user_id: String,
  pub status: SubscriptionStatus,
  pub amount: i64,
  pub interval: BillingInterval,
  pub currency: String,
  pub payment_method: PaymentMethod,
  pub current_period_start: Option<DateTime>,
  pub current_period_end: Option<DateTime>,
  pub cancel_at_period_end: bool,
  pub canceled_at: Option<DateTime>,
  pub provider_subscription_id: String,
  pub provider_customer_id: Option<String>,
}

pub struct Subscription<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Subscription<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Most recent subscription that currently opens the reader.
  pub async fn current(
    &self,
    user_id: &str,
  ) -> Result<Option<subscription::Model>> {
    let subscription = subscription::Entity::find()
      .filter(subscription::Column::UserId.eq(user_id))
      .filter(
        subscription::Column::Status.is_in(SubscriptionStatus::GRANTING),
      )
      .order_by_desc(subscription::Column::CreatedAt)
      .one(self.db)
      .await?;
    Ok(subscription)
  }

  /// Most recent subscription whatever its status.
  pub async fn latest(
    &self,
    user_id: &str,
  ) -> Result<Option<subscription::Model>> {
    let subscription = subscription::Entity::find()
      .filter(subscription::Column::UserId.eq(user_id))
      .order_by_desc(subscription::Column::CreatedAt)
      .one(self.db)
      .await?;
    Ok(subscription)
  }

  pub async fn by_provider_id(
    &self,
    provider_id: &str,
  ) -> Result<Option<subscription::Model>> {
    let subscription = subscription::Entity::find()
      .filter(subscription::Column::ProviderSubscriptionId.eq(provider_id))
      .one(self.db)
      .await?;
    Ok(subscription)
  }

  /// Overwrites the subscription with the same provider id, or inserts it.
  pub async fn upsert(&self, mirror: Mirror) -> Result<subscription::Model> {
    let now = utils::now();

    match self.by_provider_id(&mirror.provider_subscription_id).await? {
      Some(existing) => {
        let mut model: subscription::ActiveModel = existing.into();
        apply(&mut model, mirror, now);
        Ok(model.update(self.db).await?)
      }
      None => {
        let mut model = subscription::ActiveModel {
          id: Set(Uuid::new_v4().to_string()),
          created_at: Set(now),
          ..Default::default()
        };
        apply(&mut model, mirror, now);
        Ok(model.insert(self.db).await?)
      }
    }
  }
}

fn apply(model: &mut subscription::ActiveModel, mirror: Mirror, now: DateTime) {
  model.user_id = Set(mirror.user_id);
  model.status = Set(mirror.status);
  model.amount = Set(mirror.amount);
  model.interval = Set(mirror.interval);
  model.currency = Set(mirror.currency);
  model.payment_method = Set(mirror.payment_method);
  model.current_period_start = Set(mirror.current_period_start);
  model.current_period_end = Set(mirror.current_period_end);
  model.cancel_at_period_end = Set(mirror.cancel_at_period_end);
  model.canceled_at = Set(mirror.canceled_at);
  model.provider_subscription_id = Set(mirror.provider_subscription_id);
  model.provider_customer_id = Set(mirror.provider_customer_id);
  model.updated_at = Set(now);
}
