use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
  access::Entitlement,
  entity::{BillingInterval, SubscriptionStatus},
  prelude::*,
  state::AppState,
};

/// Treats empty query values like absent ones.
pub(super) fn present(value: Option<String>) -> Option<String> {
  value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub async fn health() -> Json<json::Value> {
  Json(json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQuery {
  pdf_id: Option<String>,
  user_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseAccess {
  has_access: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

impl PurchaseAccess {
  fn failed(error: impl Into<String>) -> Self {
    Self { has_access: false, error: Some(error.into()) }
  }
}

/// Purchase-only check used by the reader before a subscription exists.
pub async fn check_pdf_access(
  State(app): State<Arc<AppState>>,
  Query(query): Query<PurchaseQuery>,
) -> (StatusCode, Json<PurchaseAccess>) {
  let (Some(pdf_id), Some(email)) =
    (present(query.pdf_id), present(query.user_email))
  else {
    return (
      StatusCode::BAD_REQUEST,
      Json(PurchaseAccess::failed("pdfId and userEmail are required")),
    );
  };

  match app.sv().order.owns(&email, &pdf_id).await {
    Ok(has_access) => {
      (StatusCode::OK, Json(PurchaseAccess { has_access, error: None }))
    }
    Err(err) => {
      error!(pdf_id, "Purchase check failed: {err}");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PurchaseAccess::failed("Internal error")),
      )
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuery {
  pdf_id: Option<String>,
  user_id: Option<String>,
}

pub async fn pdf_access(
  State(app): State<Arc<AppState>>,
  Query(query): Query<AccessQuery>,
) -> Result<Json<Entitlement>> {
  let pdf_id = present(query.pdf_id).ok_or(Error::MissingParam("pdfId"))?;
  let user_id = present(query.user_id);

  let entitlement = app.sv().access.check(user_id.as_deref(), &pdf_id).await;
  debug!(pdf_id, user_id, ?entitlement, "Resolved PDF access");

  Ok(Json(entitlement))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
  user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
  success: bool,
  is_active: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  subscription: Option<SubscriptionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
  status: SubscriptionStatus,
  #[serde(rename = "type")]
  kind: BillingInterval,
  start_date: Option<DateTime>,
  end_date: Option<DateTime>,
  days_remaining: i64,
}

pub async fn subscription_status(
  State(app): State<Arc<AppState>>,
  Query(request): Query<StatusRequest>,
) -> Result<Json<StatusResponse>> {
  status_of(&app, request.user_id).await
}

pub async fn subscription_status_body(
  State(app): State<Arc<AppState>>,
  Json(request): Json<StatusRequest>,
) -> Result<Json<StatusResponse>> {
  status_of(&app, request.user_id).await
}

async fn status_of(
  app: &AppState,
  user_id: Option<String>,
) -> Result<Json<StatusResponse>> {
  let user_id = present(user_id).ok_or(Error::MissingParam("userId"))?;

  let sv = app.sv();
  sv.user.by_id(&user_id).await?.ok_or(Error::UserNotFound)?;

  let Some(latest) = sv.subscription.latest(&user_id).await? else {
    return Ok(Json(StatusResponse {
      success: true,
      is_active: false,
      subscription: None,
    }));
  };

  let now = utils::now();
  let end = latest.current_period_end;
  let is_active =
    latest.status.grants_access() && end.is_none_or(|end| end > now);

  Ok(Json(StatusResponse {
    success: true,
    is_active,
    subscription: Some(SubscriptionView {
      status: latest.status,
      kind: latest.interval,
      start_date: latest.current_period_start,
      end_date: end,
      days_remaining: end.map_or(0, |end| utils::days_remaining(end, now)),
    }),
  }))
}
