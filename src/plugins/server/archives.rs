//! Archive catalog routes
//!
//! The download route trusts the `userId` query parameter as the reader's
//! identity. It must sit behind a gateway that authenticates the reader and
//! sets or checks that parameter; exposed directly, any caller naming a
//! subscriber's id receives the asset url.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
  access::Reason,
  entity::archive,
  prelude::*,
  state::AppState,
  sv::archive::Page,
};

#[derive(Debug, Serialize)]
pub struct Years {
  years: Vec<i32>,
}

pub async fn years(State(app): State<Arc<AppState>>) -> Result<Json<Years>> {
  let years = app.sv().archive.years().await?;
  Ok(Json(Years { years }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
  page: Option<u64>,
  per_page: Option<u64>,
}

pub async fn page(
  State(app): State<Arc<AppState>>,
  Path(year): Path<i32>,
  Query(query): Query<PageQuery>,
) -> Result<Json<Page<archive::Model>>> {
  let page = app
    .sv()
    .archive
    .page(
      year,
      query.page.unwrap_or(1),
      query.per_page.unwrap_or(app.config.archive_page_size),
    )
    .await?;
  Ok(Json(page))
}

pub async fn get(
  State(app): State<Arc<AppState>>,
  Path((year, id)): Path<(i32, String)>,
) -> Result<Json<archive::Model>> {
  Ok(Json(app.sv().archive.get(year, &id).await?))
}

pub async fn view(
  State(app): State<Arc<AppState>>,
  Path((year, id)): Path<(i32, String)>,
) -> Result<Json<json::Value>> {
  app.sv().archive.record_view(year, &id).await?;
  Ok(Json(json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
  user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Download {
  url: String,
  reason: Reason,
}

/// Hands out the asset url once the reader is entitled to the issue.
pub async fn download(
  State(app): State<Arc<AppState>>,
  Path((year, id)): Path<(i32, String)>,
  Query(query): Query<DownloadQuery>,
) -> Result<Response> {
  let sv = app.sv();
  let archive = sv.archive.get(year, &id).await?;

  let user_id = super::handlers::present(query.user_id);
  let entitlement = sv.access.check(user_id.as_deref(), &id).await;
  if !entitlement.granted() {
    debug!(year, id, user_id, "Download denied");
    return Ok((StatusCode::FORBIDDEN, Json(entitlement)).into_response());
  }

  sv.archive.record_download(year, &id).await?;
  info!(year, id, user_id, reason = ?entitlement.reason, "Download granted");

  Ok(Json(Download { url: archive.asset_url, reason: entitlement.reason })
    .into_response())
}

#[cfg(test)]
mod tests {
  use super::{
    super::tests::{get, send},
    *,
  };
  use crate::{
    entity::OrderStatus,
    testing::{self, Customers, Payments},
  };

  async fn app() -> Arc<AppState> {
    let db = testing::db().await;
    testing::user(&db, "uid-1", "awa@example.ci").await;
    testing::archive(&db, 2023, "doc100", 5).await;
    testing::archive(&db, 2024, "doc123", 3).await;
    testing::archive(&db, 2024, "doc124", 10).await;
    testing::archive(&db, 2024, "doc125", 17).await;
    testing::state(db, Customers::default(), Payments::down())
  }

  fn post(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri).body(axum::body::Body::empty()).unwrap()
  }

  #[tokio::test]
  async fn lists_years_newest_first() {
    let (status, body) = send(app().await, get("/api/archives")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json::json!({ "years": [2024, 2023] }));
  }

  #[tokio::test]
  async fn pages_a_year_by_publication_date() {
    let app = app().await;

    let (status, body) =
      send(app.clone(), get("/api/archives/2024?page=1&perPage=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["items"][0]["id"], "doc125");
    assert_eq!(body["items"][1]["id"], "doc124");

    let (_, body) =
      send(app.clone(), get("/api/archives/2024?page=2&perPage=2")).await;
    assert_eq!(body["items"][0]["id"], "doc123");

    let (_, body) = send(app, get("/api/archives/2024?perPage=500")).await;
    assert_eq!(body["perPage"], 100);
  }

  #[tokio::test]
  async fn out_of_range_page_is_rejected() {
    let app = app().await;

    let uri = format!("/api/archives/2024?page={}&perPage=100", u64::MAX);
    let (status, body) = send(app, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn missing_document_is_not_found() {
    let app = app().await;

    let (status, _) = send(app.clone(), get("/api/archives/2024/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app, post("/api/archives/2024/nope/views")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn views_are_counted() {
    let app = app().await;

    send(app.clone(), post("/api/archives/2024/doc123/views")).await;
    send(app.clone(), post("/api/archives/2024/doc123/views")).await;

    let (_, body) = send(app, get("/api/archives/2024/doc123")).await;
    assert_eq!(body["views"], 2);
  }

  #[tokio::test]
  async fn download_requires_entitlement() {
    let app = app().await;
    let uri = "/api/archives/2024/doc123/download?userId=uid-1";

    let (status, body) = send(app.clone(), get(uri)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json::json!({ "hasAccess": false, "reason": "none" }));

    testing::order(&app.db, "awa@example.ci", &["doc123"], OrderStatus::Paid)
      .await;

    let (status, body) = send(app.clone(), get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], "purchase");
    assert_eq!(
      body["url"],
      "https://cdn.example/archives/pdf/2024/doc123.pdf"
    );

    let (_, body) = send(app, get("/api/archives/2024/doc123")).await;
    assert_eq!(body["downloads"], 1);
  }

  #[tokio::test]
  async fn anonymous_download_is_forbidden() {
    let (status, _) =
      send(app().await, get("/api/archives/2024/doc123/download")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }
}
