//! Shared fixtures for unit tests

use chrono::NaiveDate;

use crate::{
  entity::{LineItem, OrderStatus, order, order::LineItems},
  migration::Migrator,
  prelude::*,
  providers::{CustomerDirectory, Payment, PaymentCheck, PaymentStatus},
  state::{AppState, Config},
  sv,
};

pub const WEBHOOK_SECRET: &str = "whsec_test";

pub async fn db() -> DatabaseConnection {
  let db = Database::connect("sqlite::memory:").await.unwrap();
  Migrator::up(&db, None).await.unwrap();
  db
}

pub async fn user(db: &DatabaseConnection, id: &str, email: &str) {
  sv::User::new(db)
    .create(sv::user::NewUser {
      id: id.into(),
      email: email.into(),
      ..Default::default()
    })
    .await
    .unwrap();
}

pub fn item(id: &str, price: i64) -> LineItem {
  LineItem {
    id: id.into(),
    title: format!("Afrikipresse {id}"),
    cover_url: None,
    asset_url: None,
    price,
    year: 2024,
  }
}

pub async fn order(
  db: &DatabaseConnection,
  email: &str,
  pdf_ids: &[&str],
  status: OrderStatus,
) -> order::Model {
  order::ActiveModel {
    id: Set(format!("order-{}", uuid::Uuid::new_v4())),
    transaction_id: Set(uuid::Uuid::new_v4().simple().to_string()),
    user_id: Set(None),
    customer_email: Set(email.into()),
    customer_name: Set(None),
    customer_phone: Set(None),
    items: Set(LineItems(pdf_ids.iter().map(|id| item(id, 500)).collect())),
    plan: Set(None),
    total_amount: Set(500 * pdf_ids.len() as i64),
    currency: Set("XOF".into()),
    status: Set(status),
    created_at: Set(utils::now()),
    paid_at: Set(None),
  }
  .insert(db)
  .await
  .unwrap()
}

/// Seeds an issue published on `day` January of `year`.
pub async fn archive(db: &DatabaseConnection, year: i32, id: &str, day: u32) {
  let published_at = NaiveDate::from_ymd_opt(year, 1, day)
    .unwrap()
    .and_hms_opt(6, 0, 0)
    .unwrap();

  sv::Archive::new(db)
    .create(sv::archive::NewArchive {
      year,
      id: id.into(),
      filename: format!("afrikipresse-{id}.pdf"),
      title: format!("Afrikipresse {id}"),
      published_at,
      asset_url: format!("https://cdn.example/archives/pdf/{year}/{id}.pdf"),
      size_bytes: 1024,
      ..Default::default()
    })
    .await
    .unwrap();
}

#[derive(Default)]
pub struct Customers {
  pub users: HashMap<String, String>,
  pub fail: bool,
}

#[async_trait]
impl CustomerDirectory for Customers {
  async fn customer_user_id(
    &self,
    customer_id: &str,
  ) -> Result<Option<String>> {
    if self.fail {
      return Err(Error::Provider("stripe unreachable".into()));
    }
    Ok(self.users.get(customer_id).cloned())
  }
}

/// CinetPay stand-in; `None` behaves like an unreachable provider.
pub struct Payments(pub Option<Payment>);

impl Payments {
  pub fn down() -> Self {
    Self(None)
  }

  /// Answers `status` without reporting the charged amount.
  pub fn answering(status: PaymentStatus) -> Self {
    Self(Some(Payment { status, amount: None, currency: None }))
  }
}

#[async_trait]
impl PaymentCheck for Payments {
  async fn check(&self, _transaction_id: &str) -> Result<Payment> {
    let payment = self.0.clone();
    payment.ok_or_else(|| Error::Provider("cinetpay unreachable".into()))
  }
}

pub fn config() -> Config {
  Config {
    stripe_webhook_secret: WEBHOOK_SECRET.into(),
    ..Default::default()
  }
}

pub fn state(
  db: DatabaseConnection,
  customers: Customers,
  payments: Payments,
) -> Arc<AppState> {
  Arc::new(AppState::new(db, config(), Arc::new(customers), Arc::new(payments)))
}
