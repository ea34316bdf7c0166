use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{BillingInterval, LineItem, order},
  prelude::*,
  state::AppState,
  sv::order::NewOrder,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
  #[serde(default)]
  customer_email: String,
  customer_name: Option<String>,
  customer_phone: Option<String>,
  user_id: Option<String>,
  #[serde(default)]
  items: Vec<LineItem>,
  plan: Option<BillingInterval>,
}

#[derive(Debug, Serialize)]
pub struct Created {
  success: bool,
  order: order::Model,
}

pub async fn create(
  State(app): State<Arc<AppState>>,
  Json(req): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Created>)> {
  let order = app
    .sv()
    .order
    .create(
      NewOrder {
        user_id: super::handlers::present(req.user_id),
        customer_email: req.customer_email,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        items: req.items,
        plan: req.plan,
      },
      &app.config.plans,
    )
    .await?;

  info!(
    transaction_id = %order.transaction_id,
    total = order.total_amount,
    plan = ?order.plan,
    "Order created"
  );

  Ok((StatusCode::CREATED, Json(Created { success: true, order })))
}

pub async fn by_transaction(
  State(app): State<Arc<AppState>>,
  Path(transaction_id): Path<String>,
) -> Result<Json<order::Model>> {
  let order = app
    .sv()
    .order
    .by_transaction(&transaction_id)
    .await?
    .ok_or(Error::OrderNotFound)?;
  Ok(Json(order))
}
