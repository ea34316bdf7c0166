mod archives;
mod handlers;
mod orders;
mod webhooks;

use std::net::SocketAddr;

use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

pub fn routes() -> Router<Arc<AppState>> {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/check-pdf-access", get(handlers::check_pdf_access))
    .route("/api/pdf-access", get(handlers::pdf_access))
    .route(
      "/api/subscription-status",
      get(handlers::subscription_status)
        .post(handlers::subscription_status_body),
    )
    .route("/api/orders", post(orders::create))
    .route("/api/orders/{transaction_id}", get(orders::by_transaction))
    .route("/api/archives", get(archives::years))
    .route("/api/archives/{year}", get(archives::page))
    .route("/api/archives/{year}/{id}", get(archives::get))
    .route("/api/archives/{year}/{id}/views", post(archives::view))
    .route("/api/archives/{year}/{id}/download", get(archives::download))
    .route("/api/webhooks/stripe", post(webhooks::stripe))
    .route("/api/webhooks/cinetpay", post(webhooks::cinetpay))
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    // 2 requests per second per IP with bursts of 100
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = routes()
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .with_state(app)
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on {addr}");

    let limiter = async {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt;

  use super::*;

  pub async fn send(
    app: Arc<AppState>,
    request: Request<Body>,
  ) -> (StatusCode, json::Value) {
    let response = routes().with_state(app).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
      json::Value::Null
    } else {
      json::from_slice(&bytes).unwrap_or(json::Value::Null)
    };
    (status, body)
  }

  pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
  }

  pub fn post_json(uri: &str, body: json::Value) -> Request<Body> {
    Request::post(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  #[tokio::test]
  async fn health_answers() {
    let app = crate::testing::state(
      crate::testing::db().await,
      Default::default(),
      crate::testing::Payments::down(),
    );

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }
}
