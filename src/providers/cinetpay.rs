use serde::{Deserialize, Serialize};

use super::{Payment, PaymentCheck, PaymentStatus};
use crate::prelude::*;

pub const CHECK_URL: &str =
  "https://api-checkout.cinetpay.com/v2/payment/check";

/// Code CinetPay returns when the check itself succeeded.
const SUCCESS_CODE: &str = "00";

pub struct CinetPay {
  http: reqwest::Client,
  check_url: String,
  api_key: String,
  site_id: String,
}

impl CinetPay {
  pub fn new(
    http: reqwest::Client,
    check_url: String,
    api_key: String,
    site_id: String,
  ) -> Self {
    Self { http, check_url, api_key, site_id }
  }
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
  apikey: &'a str,
  site_id: &'a str,
  transaction_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CheckResponse {
  pub code: String,
  #[serde(default)]
  pub message: String,
  pub data: Option<CheckData>,
}

#[derive(Debug, Deserialize)]
pub struct CheckData {
  #[serde(default)]
  pub status: String,
  /// Sent as a string by the v2 API, as a number by older integrations
  #[serde(default)]
  pub amount: Option<json::Value>,
  #[serde(default)]
  pub currency: Option<String>,
}

impl CheckData {
  fn amount(&self) -> Option<i64> {
    match self.amount.as_ref()? {
      json::Value::Number(number) => number.as_i64(),
      json::Value::String(amount) => amount.trim().parse().ok(),
      _ => None,
    }
  }
}

impl CheckResponse {
  pub fn status(&self) -> PaymentStatus {
    let status = self.data.as_ref().map(|data| data.status.as_str());

    match (self.code.as_str(), status) {
      (SUCCESS_CODE, Some("ACCEPTED")) => PaymentStatus::Accepted,
      (_, Some("REFUSED" | "CANCELED")) => PaymentStatus::Refused,
      _ => match self.message.as_str() {
        "PAYMENT_FAILED" | "TRANSACTION_CANCEL" => PaymentStatus::Refused,
        _ => PaymentStatus::Pending,
      },
    }
  }

  pub fn payment(&self) -> Payment {
    let data = self.data.as_ref();
    Payment {
      status: self.status(),
      amount: data.and_then(CheckData::amount),
      currency: data.and_then(|data| data.currency.clone()),
    }
  }
}

#[async_trait]
impl PaymentCheck for CinetPay {
  async fn check(&self, transaction_id: &str) -> Result<Payment> {
    let resp = self
      .http
      .post(&self.check_url)
      .json(&CheckRequest {
        apikey: &self.api_key,
        site_id: &self.site_id,
        transaction_id,
      })
      .send()
      .await?;

    // error codes come back with a non-2xx status and a regular body
    let status = resp.status();
    let body = resp.text().await?;

    let check: CheckResponse = json::from_str(&body).map_err(|err| {
      Error::Provider(format!(
        "cinetpay check status={status} error={err} body={body}"
      ))
    })?;

    debug!(
      transaction_id,
      code = %check.code,
      message = %check.message,
      "CinetPay check answered"
    );

    Ok(check.payment())
  }
}
