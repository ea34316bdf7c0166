use crate::{
  access::{self, Entitlement, Source},
  entity::SubscriptionStatus,
  prelude::*,
  sv,
};

/// Store-backed entitlement source.
pub struct Access<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Access<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Resolves the entitlement of a user known only by id. A missing id is an
  /// anonymous reader; an unknown or unreadable user is denied.
  pub async fn check(
    &self,
    user_id: Option<&str>,
    pdf_id: &str,
  ) -> Entitlement {
    let Some(user_id) = user_id else {
      return access::resolve(self, None, pdf_id).await;
    };

    let identity = match sv::User::new(self.db).identity(user_id).await {
      Ok(identity) => identity,
      Err(err) => {
        warn!(user_id, "User lookup failed: {err}");
        return Entitlement::DENIED;
      }
    };

    access::resolve(self, identity.as_ref(), pdf_id).await
  }
}

#[async_trait]
impl Source for Access<'_> {
  async fn current_subscription(
    &self,
    user_id: &str,
  ) -> Result<Option<SubscriptionStatus>> {
    let current = sv::Subscription::new(self.db).current(user_id).await?;
    Ok(current.map(|subscription| subscription.status))
  }

  async fn purchased(&self, email: &str, pdf_id: &str) -> Result<bool> {
    sv::Order::new(self.db).owns(email, pdf_id).await
  }
}
