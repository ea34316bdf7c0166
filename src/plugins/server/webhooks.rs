//! Payment provider callbacks
//!
//! Stripe deliveries are signed and carry the subscription object, which is
//! mirrored as-is. CinetPay notifications only name a transaction; its status
//! is always re-read from CinetPay before the order is touched.

use axum::{
  Form, Json,
  body::Bytes,
  extract::{FromRequest, Request, State},
  http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{OrderStatus, PaymentMethod, SubscriptionStatus, order},
  prelude::*,
  providers::stripe,
  state::AppState,
  sv::subscription::Mirror,
};

const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Serialize)]
pub struct Received {
  received: bool,
}

pub async fn stripe(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  body: Bytes,
) -> (StatusCode, Json<Received>) {
  match stripe_event(&app, &headers, &body).await {
    Ok(()) => (StatusCode::OK, Json(Received { received: true })),
    Err(err) => {
      let status = err.status();
      if status.is_server_error() {
        error!("Stripe webhook failed: {err}");
      } else {
        warn!("Stripe webhook rejected: {err}");
      }
      (status, Json(Received { received: false }))
    }
  }
}

async fn stripe_event(
  app: &AppState,
  headers: &HeaderMap,
  body: &[u8],
) -> Result<()> {
  let signature = headers
    .get(SIGNATURE_HEADER)
    .and_then(|value| value.to_str().ok())
    .ok_or(Webhook::MissingSignature)?;

  stripe::verify_signature(
    body,
    signature,
    &app.config.stripe_webhook_secret,
    app.config.webhook_tolerance,
    Utc::now().timestamp(),
  )?;

  let event: stripe::Event =
    json::from_slice(body).map_err(|_| Webhook::Malformed)?;

  let deleted = match event.kind.as_str() {
    "customer.subscription.created" | "customer.subscription.updated" => false,
    "customer.subscription.deleted" => true,
    kind => {
      debug!(event_id = %event.id, kind, "Ignoring Stripe event");
      return Ok(());
    }
  };

  let subscription: stripe::Subscription =
    json::from_value(event.data.object).map_err(|_| Webhook::Malformed)?;

  let Some(user_id) = stripe_user(app, &subscription.customer).await? else {
    error!(
      event_id = %event.id,
      customer_id = %subscription.customer,
      "No user for Stripe customer, dropping event"
    );
    return Ok(());
  };

  let mirror = subscription.mirror(user_id.clone(), deleted);
  let status = mirror.status;

  let sv = app.sv();
  sv.subscription.upsert(mirror).await?;
  sv.user.set_subscription_status(&user_id, status).await?;

  info!(
    event_id = %event.id,
    subscription_id = %subscription.id,
    user_id,
    ?status,
    "Stripe subscription mirrored"
  );
  Ok(())
}

/// Local user of a Stripe customer: the stored mapping first, then the
/// customer metadata, which links the mapping for the next deliveries.
async fn stripe_user(
  app: &AppState,
  customer_id: &str,
) -> Result<Option<String>> {
  let sv = app.sv();
  if let Some(user) = sv.user.by_stripe_customer(customer_id).await? {
    return Ok(Some(user.id));
  }

  let user_id = match app.customers.customer_user_id(customer_id).await {
    Ok(Some(user_id)) => user_id,
    Ok(None) => return Ok(None),
    Err(err) => {
      error!(customer_id, "Stripe customer lookup failed: {err}");
      return Ok(None);
    }
  };

  if sv.user.by_id(&user_id).await?.is_none() {
    warn!(customer_id, user_id, "Stripe customer points to an unknown user");
    return Ok(None);
  }

  sv.user.link_stripe_customer(&user_id, customer_id).await?;
  Ok(Some(user_id))
}

#[derive(Debug, Deserialize)]
pub struct Notification {
  cpm_trans_id: Option<String>,
  cpm_trans_status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
  success: bool,
  transaction_id: String,
  status: OrderStatus,
  subscription_activated: bool,
}

/// CinetPay posts either a form or a JSON body depending on the integration.
async fn notification(request: Request) -> Result<Notification> {
  let form = request
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .is_some_and(|value| {
      value.starts_with("application/x-www-form-urlencoded")
    });

  if form {
    let Form(notification) = Form::from_request(request, &())
      .await
      .map_err(|err| Error::Invalid(err.body_text()))?;
    Ok(notification)
  } else {
    let Json(notification) = Json::from_request(request, &())
      .await
      .map_err(|err| Error::Invalid(err.body_text()))?;
    Ok(notification)
  }
}

pub async fn cinetpay(
  State(app): State<Arc<AppState>>,
  request: Request,
) -> Result<Json<Settlement>> {
  let notification = notification(request).await?;
  let transaction_id = super::handlers::present(notification.cpm_trans_id)
    .ok_or(Error::MissingParam("cpm_trans_id"))?;

  let sv = app.sv();
  let order = sv
    .order
    .by_transaction(&transaction_id)
    .await?
    .ok_or(Error::OrderNotFound)?;

  let payment = app.payments.check(&transaction_id).await?;
  debug!(
    transaction_id,
    reported = ?notification.cpm_trans_status,
    ?payment,
    "CinetPay payment re-verified"
  );

  let mut verified = payment.status.order_status();
  if verified == OrderStatus::Paid
    && !payment.covers(order.total_amount, &order.currency)
  {
    error!(
      transaction_id,
      expected = order.total_amount,
      currency = %order.currency,
      charged = ?payment.amount,
      charged_currency = ?payment.currency,
      "CinetPay charge does not match the order, leaving it unpaid"
    );
    verified = OrderStatus::Pending;
  }

  let was_paid = order.status == OrderStatus::Paid;
  let order = sv.order.settle(order, verified).await?;

  let subscription_activated = !was_paid
    && order.status == OrderStatus::Paid
    && activate_plan(&app, &order).await?;

  info!(
    transaction_id,
    status = ?order.status,
    subscription_activated,
    "CinetPay notification processed"
  );

  Ok(Json(Settlement {
    success: true,
    transaction_id,
    status: order.status,
    subscription_activated,
  }))
}

/// Opens the subscription bought by a freshly paid plan order.
async fn activate_plan(app: &AppState, order: &order::Model) -> Result<bool> {
  let (Some(plan), Some(user_id)) = (order.plan, order.user_id.as_deref())
  else {
    return Ok(false);
  };

  let sv = app.sv();
  if sv.user.by_id(user_id).await?.is_none() {
    warn!(
      transaction_id = %order.transaction_id,
      user_id,
      "Paid plan order for an unknown user"
    );
    return Ok(false);
  }

  let start = utils::now();
  sv.subscription
    .upsert(Mirror {
      user_id: user_id.to_string(),
      status: SubscriptionStatus::Active,
      amount: order.total_amount,
      interval: plan,
      currency: order.currency.clone(),
      payment_method: PaymentMethod::Cinetpay,
      current_period_start: Some(start),
      current_period_end: Some(utils::period_end(start, plan)),
      cancel_at_period_end: false,
      canceled_at: None,
      provider_subscription_id: order.transaction_id.clone(),
      provider_customer_id: None,
    })
    .await?;
  sv.user.set_subscription_status(user_id, SubscriptionStatus::Active).await?;

  Ok(true)
}
