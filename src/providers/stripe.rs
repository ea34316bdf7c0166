//! Stripe REST glue: customer metadata lookup, webhook signatures and the
//! subscription object carried by `customer.subscription.*` events.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::CustomerDirectory;
use crate::{
  entity::{BillingInterval, PaymentMethod, SubscriptionStatus},
  prelude::*,
  sv::subscription::Mirror,
};

const API_BASE: &str = "https://api.stripe.com/v1";

/// Metadata keys the signup flow has used to store the local user id.
const USER_ID_KEYS: [&str; 3] = ["userId", "firebaseUID", "user_id"];

pub struct Stripe {
  http: reqwest::Client,
  secret_key: String,
}

impl Stripe {
  pub fn new(http: reqwest::Client, secret_key: String) -> Self {
    Self { http, secret_key }
  }
}

#[derive(Debug, Deserialize)]
struct Customer {
  #[serde(default)]
  metadata: HashMap<String, String>,
}

fn user_id_from(metadata: &HashMap<String, String>) -> Option<String> {
  USER_ID_KEYS
    .iter()
    .filter_map(|key| metadata.get(*key))
    .find(|value| !value.is_empty())
    .cloned()
}

#[async_trait]
impl CustomerDirectory for Stripe {
  async fn customer_user_id(
    &self,
    customer_id: &str,
  ) -> Result<Option<String>> {
    let resp = self
      .http
      .get(format!("{API_BASE}/customers/{customer_id}"))
      .basic_auth(&self.secret_key, None::<&str>)
      .send()
      .await?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Provider(format!(
        "stripe customer lookup status={status} body={body}"
      )));
    }

    let customer: Customer = resp.json().await?;
    Ok(user_id_from(&customer.metadata))
  }
}

/// Verifies a `Stripe-Signature` header (`t=<ts>,v1=<hex>`) against the raw
/// body. `now` is unix seconds.
pub fn verify_signature(
  payload: &[u8],
  header: &str,
  secret: &str,
  tolerance: Duration,
  now: i64,
) -> Result<(), Webhook> {
  let mut timestamp = None;
  let mut signatures = Vec::new();
  for part in header.split(',') {
    match part.trim().split_once('=') {
      Some(("t", value)) => timestamp = Some(value),
      Some(("v1", value)) => signatures.push(value),
      _ => {}
    }
  }

  let (Some(timestamp), false) = (timestamp, signatures.is_empty()) else {
    return Err(Webhook::Malformed);
  };

  let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
    .map_err(|_| Webhook::BadSignature)?;
  mac.update(timestamp.as_bytes());
  mac.update(b".");
  mac.update(payload);

  let matched = signatures.iter().any(|signature| {
    hex::decode(signature)
      .is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
  });
  if !matched {
    return Err(Webhook::BadSignature);
  }

  let ts: i64 = timestamp.parse().map_err(|_| Webhook::Malformed)?;
  if now.abs_diff(ts) > tolerance.as_secs() {
    return Err(Webhook::Expired);
  }

  Ok(())
}

#[derive(Debug, Deserialize)]
pub struct Event {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
  pub object: json::Value,
}

#[derive(Debug, Deserialize)]
pub struct Subscription {
  pub id: String,
  pub customer: String,
  pub status: String,
  #[serde(default)]
  pub cancel_at_period_end: bool,
  pub canceled_at: Option<i64>,
  pub current_period_start: Option<i64>,
  pub current_period_end: Option<i64>,
  #[serde(default)]
  pub items: List<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct List<T> {
  #[serde(default = "Vec::new")]
  pub data: Vec<T>,
}

impl<T> Default for List<T> {
  fn default() -> Self {
    Self { data: Vec::new() }
  }
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionItem {
  pub price: Price,
  pub current_period_start: Option<i64>,
  pub current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Price {
  pub unit_amount: Option<i64>,
  pub currency: String,
  pub recurring: Option<Recurring>,
}

#[derive(Debug, Deserialize)]
pub struct Recurring {
  pub interval: String,
  #[serde(default = "one")]
  pub interval_count: u32,
}

fn one() -> u32 {
  1
}

impl Subscription {
  /// Local mirror of this subscription. Deleted subscriptions are always
  /// recorded as canceled.
  pub fn mirror(&self, user_id: String, deleted: bool) -> Mirror {
    let item = self.items.data.first();
    let price = item.map(|item| &item.price);

    let interval = price
      .and_then(|price| price.recurring.as_ref())
      .map(|r| BillingInterval::from_stripe(&r.interval, r.interval_count))
      .unwrap_or(BillingInterval::Month);

    let status = if deleted {
      SubscriptionStatus::Canceled
    } else {
      SubscriptionStatus::from_stripe(&self.status)
    };

    let period_start = self
      .current_period_start
      .or_else(|| item.and_then(|item| item.current_period_start));
    let period_end = self
      .current_period_end
      .or_else(|| item.and_then(|item| item.current_period_end));

    Mirror {
      user_id,
      status,
      amount: price.and_then(|price| price.unit_amount).unwrap_or(0),
      interval,
      currency: price.map(|price| price.currency.clone()).unwrap_or_default(),
      payment_method: PaymentMethod::Stripe,
      current_period_start: period_start.and_then(utils::from_unix),
      current_period_end: period_end.and_then(utils::from_unix),
      cancel_at_period_end: self.cancel_at_period_end,
      canceled_at: self.canceled_at.and_then(utils::from_unix),
      provider_subscription_id: self.id.clone(),
      provider_customer_id: Some(self.customer.clone()),
    }
  }
}

/// Builds a valid signature header; used by tests.
#[cfg(test)]
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
  let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
  mac.update(format!("{timestamp}.").as_bytes());
  mac.update(payload);
  format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "whsec_test";
  const TOLERANCE: Duration = Duration::from_secs(300);

  #[test]
  fn accepts_fresh_signature() {
    let body = br#"{"id":"evt_1"}"#;
    let header = sign(body, SECRET, 1_700_000_000);

    assert_eq!(
      verify_signature(body, &header, SECRET, TOLERANCE, 1_700_000_100),
      Ok(())
    );
  }

  #[test]
  fn rejects_tampered_body() {
    let header = sign(br#"{"id":"evt_1"}"#, SECRET, 1_700_000_000);

    assert_eq!(
      verify_signature(
        br#"{"id":"evt_2"}"#,
        &header,
        SECRET,
        TOLERANCE,
        1_700_000_000
      ),
      Err(Webhook::BadSignature)
    );
  }

  #[test]
  fn rejects_stale_delivery() {
    let body = b"{}";
    let header = sign(body, SECRET, 1_700_000_000);

    assert_eq!(
      verify_signature(body, &header, SECRET, TOLERANCE, 1_700_001_000),
      Err(Webhook::Expired)
    );
  }

  #[test]
  fn rejects_header_without_v1() {
    assert_eq!(
      verify_signature(b"{}", "t=1700000000", SECRET, TOLERANCE, 1_700_000_000),
      Err(Webhook::Malformed)
    );
  }

  #[test]
  fn any_v1_may_match_during_secret_rotation() {
    let body = b"{}";
    let valid = sign(body, SECRET, 1_700_000_000);
    let header = format!("{valid},v1=deadbeef");

    assert!(
      verify_signature(body, &header, SECRET, TOLERANCE, 1_700_000_000).is_ok()
    );
  }

  #[test]
  fn metadata_user_id_fallbacks() {
    let metadata =
      HashMap::from([("firebaseUID".to_string(), "uid-9".to_string())]);
    assert_eq!(user_id_from(&metadata).as_deref(), Some("uid-9"));

    let empty = HashMap::from([("userId".to_string(), String::new())]);
    assert_eq!(user_id_from(&empty), None);
  }

  #[test]
  fn semester_subscription_mirror() {
    let raw = json::json!({
      "id": "sub_1",
      "customer": "cus_1",
      "status": "unpaid",
      "cancel_at_period_end": true,
      "canceled_at": null,
      "items": { "data": [{
        "price": {
          "unit_amount": 4990,
          "currency": "eur",
          "recurring": { "interval": "month", "interval_count": 6 }
        },
        "current_period_start": 1_700_000_000,
        "current_period_end": 1_715_000_000
      }]}
    });

    let sub: Subscription = json::from_value(raw).unwrap();
    let mirror = sub.mirror("uid-1".into(), false);

    assert_eq!(mirror.status, SubscriptionStatus::PastDue);
    assert_eq!(mirror.interval, BillingInterval::Semester);
    assert_eq!(mirror.amount, 4990);
    assert_eq!(mirror.current_period_end, utils::from_unix(1_715_000_000));
    assert!(mirror.cancel_at_period_end);

    let deleted = sub.mirror("uid-1".into(), true);
    assert_eq!(deleted.status, SubscriptionStatus::Canceled);
  }
}
