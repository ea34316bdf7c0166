//! Error types for the access server

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};

/// Reasons a provider webhook delivery is rejected before it is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Webhook {
  #[error("missing signature header")]
  MissingSignature,
  #[error("signature mismatch")]
  BadSignature,
  #[error("timestamp outside tolerance")]
  Expired,
  #[error("malformed payload")]
  Malformed,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("payment provider error: {0}")]
  Provider(String),

  #[error("user not found")]
  UserNotFound,

  #[error("order not found")]
  OrderNotFound,

  #[error("archive not found")]
  ArchiveNotFound,

  #[error("missing required parameter `{0}`")]
  MissingParam(&'static str),

  #[error("invalid request: {0}")]
  Invalid(String),

  #[error("webhook rejected: {0}")]
  Webhook(#[from] Webhook),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::MissingParam(_) | Error::Invalid(_) | Error::Webhook(_) => {
        StatusCode::BAD_REQUEST
      }
      Error::UserNotFound | Error::OrderNotFound | Error::ArchiveNotFound => {
        StatusCode::NOT_FOUND
      }
      Error::Database(_)
      | Error::Http(_)
      | Error::Provider(_)
      | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    // upstream details stay in the logs
    let message = if status.is_server_error() {
      tracing::error!("{self}");
      "Internal error".to_string()
    } else {
      self.to_string()
    };

    let body = json::json!({
      "success": false,
      "error": message,
    });

    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
