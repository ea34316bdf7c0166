//! Payment provider clients
//!
//! Only the two calls the mirror needs are wrapped: the Stripe customer
//! lookup used to resolve webhook customers, and the CinetPay status check
//! used to re-verify payment notifications.

pub mod cinetpay;
pub mod stripe;

pub use cinetpay::CinetPay;
pub use stripe::Stripe;

use crate::{entity::OrderStatus, prelude::*};

/// Payment outcome as reported by the provider's own status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
  Accepted,
  Refused,
  Pending,
}

impl PaymentStatus {
  pub fn order_status(self) -> OrderStatus {
    match self {
      Self::Accepted => OrderStatus::Paid,
      Self::Refused => OrderStatus::Failed,
      Self::Pending => OrderStatus::Pending,
    }
  }
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
  /// Local user id recorded in the provider-side customer metadata.
  async fn customer_user_id(&self, customer_id: &str) -> Result<Option<String>>;
}

/// Provider answer for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
  pub status: PaymentStatus,
  /// Charged amount, when the provider reports it
  pub amount: Option<i64>,
  pub currency: Option<String>,
}

impl Payment {
  /// Whether the charge matches what the order asked for. Fields the
  /// provider left out are not held against it.
  pub fn covers(&self, amount: i64, currency: &str) -> bool {
    self.amount.is_none_or(|charged| charged == amount)
      && self
        .currency
        .as_deref()
        .is_none_or(|charged| charged.eq_ignore_ascii_case(currency))
  }
}

#[async_trait]
pub trait PaymentCheck: Send + Sync {
  async fn check(&self, transaction_id: &str) -> Result<Payment>;
}
