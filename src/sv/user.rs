use crate::{
  access::Identity,
  entity::{SubscriptionStatus, user},
  prelude::*,
};

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct NewUser {
  pub id: String,
  pub email: String,
  pub display_name: Option<String>,
  pub role: crate::entity::Role,
  pub country: Option<String>,
  pub city: Option<String>,
  pub phone: Option<String>,
}

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Users are created by the signup flow; the server only needs this to
  /// seed records.
  #[cfg(test)]
  pub async fn create(&self, new: NewUser) -> Result<user::Model> {
    let user = user::ActiveModel {
      id: Set(new.id),
      email: Set(new.email),
      display_name: Set(new.display_name),
      role: Set(new.role),
      country: Set(new.country),
      city: Set(new.city),
      phone: Set(new.phone),
      stripe_customer_id: Set(None),
      subscription_status: Set(SubscriptionStatus::Inactive),
      created_at: Set(utils::now()),
    };

    Ok(user.insert(self.db).await?)
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn identity(&self, id: &str) -> Result<Option<Identity>> {
    let user = self.by_id(id).await?;
    Ok(user.map(|user| Identity { id: user.id, email: user.email }))
  }

  pub async fn by_stripe_customer(
    &self,
    customer_id: &str,
  ) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
      .filter(user::Column::StripeCustomerId.eq(customer_id))
      .one(self.db)
      .await?;
    Ok(user)
  }

  pub async fn link_stripe_customer(
    &self,
    id: &str,
    customer_id: &str,
  ) -> Result<()> {
    let user = self.by_id(id).await?.ok_or(Error::UserNotFound)?;

    user::ActiveModel {
      stripe_customer_id: Set(Some(customer_id.to_string())),
      ..user.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }

  pub async fn set_subscription_status(
    &self,
    id: &str,
    status: SubscriptionStatus,
  ) -> Result<()> {
    let user = self.by_id(id).await?.ok_or(Error::UserNotFound)?;

    user::ActiveModel { subscription_status: Set(status), ..user.into() }
      .update(self.db)
      .await?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;

  #[tokio::test]
  async fn stripe_customer_mapping() {
    let db = testing::db().await;
    let sv = User::new(&db);
    testing::user(&db, "uid-1", "awa@example.ci").await;

    assert!(sv.by_stripe_customer("cus_1").await.unwrap().is_none());

    sv.link_stripe_customer("uid-1", "cus_1").await.unwrap();

    let user = sv.by_stripe_customer("cus_1").await.unwrap().unwrap();
    assert_eq!(user.id, "uid-1");
  }

  #[tokio::test]
  async fn unknown_user_cannot_be_linked() {
    let db = testing::db().await;

    let result = User::new(&db).link_stripe_customer("ghost", "cus_1").await;
    assert!(matches!(result, Err(Error::UserNotFound)));
  }

  #[tokio::test]
  async fn identity_carries_email() {
    let db = testing::db().await;
    testing::user(&db, "uid-1", "awa@example.ci").await;

    let identity = User::new(&db).identity("uid-1").await.unwrap().unwrap();
    assert_eq!(identity.email, "awa@example.ci");
    assert!(User::new(&db).identity("ghost").await.unwrap().is_none());
  }
}
