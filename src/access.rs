//! PDF entitlement resolution
//!
//! Decides whether a reader may open a given archive document and why. The
//! decision is recomputed from the store on every call and fails closed:
//! any lookup error is reported as "no access".

use serde::Serialize;

use crate::{entity::SubscriptionStatus, prelude::*};

/// The authenticated reader, passed in explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub id: String,
  pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
  Subscription,
  Purchase,
  None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
  pub has_access: bool,
  pub reason: Reason,
}

impl Entitlement {
  pub const DENIED: Self = Self { has_access: false, reason: Reason::None };

  pub fn granted(self) -> bool {
    self.has_access
  }
}

impl From<Reason> for Entitlement {
  fn from(reason: Reason) -> Self {
    Self { has_access: reason != Reason::None, reason }
  }
}

/// Read side of the store the resolver depends on.
#[async_trait]
pub trait Source: Send + Sync {
  /// Status of the most recent subscription that is active or trialing.
  async fn current_subscription(
    &self,
    user_id: &str,
  ) -> Result<Option<SubscriptionStatus>>;

  /// Whether a paid order of `email` lists `pdf_id` among its items.
  async fn purchased(&self, email: &str, pdf_id: &str) -> Result<bool>;
}

pub async fn resolve<S: Source + ?Sized>(
  source: &S,
  user: Option<&Identity>,
  pdf_id: &str,
) -> Entitlement {
  let Some(user) = user else {
    return Entitlement::DENIED;
  };

  match source.current_subscription(&user.id).await {
    Ok(Some(status)) if status.grants_access() => {
      return Reason::Subscription.into();
    }
    Ok(_) => {}
    Err(err) => {
      warn!(user_id = %user.id, "Subscription lookup failed: {err}");
      return Entitlement::DENIED;
    }
  }

  match source.purchased(&user.email, pdf_id).await {
    Ok(true) => Reason::Purchase.into(),
    Ok(false) => Entitlement::DENIED,
    Err(err) => {
      warn!(user_id = %user.id, pdf_id, "Purchase lookup failed: {err}");
      Entitlement::DENIED
    }
  }
}
