use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request against the remote API.
///
/// Errors are `Clone` so they can be stored in cache entries and handed to
/// every view observing the same query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The request never produced a response (DNS, connect, timeout, reset)
  #[error("network error: {0}")]
  Network(String),
  /// The server answered with a non-2xx status
  #[error("HTTP error: status {status}")]
  Http { status: u16 },
  /// The response body did not decode into the expected records
  #[error("parse error: {0}")]
  Parse(String),
}

impl ApiError {
  pub(crate) fn from_status(status: StatusCode) -> Self {
    Self::Http {
      status: status.as_u16(),
    }
  }

  /// Short form for status lines and list titles.
  pub fn short(&self) -> String {
    match self {
      Self::Network(_) => "network unavailable".to_string(),
      Self::Http { status } => format!("HTTP {}", status),
      Self::Parse(_) => "malformed response".to_string(),
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(error: reqwest::Error) -> Self {
    if error.is_decode() {
      Self::Parse(error.to_string())
    } else if let Some(status) = error.status() {
      Self::from_status(status)
    } else {
      Self::Network(error.to_string())
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(error: serde_json::Error) -> Self {
    Self::Parse(error.to_string())
  }
}
