//! Core error types

use pokerbench_config::{ConfigError, RetryConfig};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors from a single hands API request
#[derive(Error, Debug)]
pub enum ApiError {
  /// Non-2xx response
  #[error("HTTP {status}: {body}")]
  Http { status: StatusCode, body: String },

  /// Connection, timeout or transport failure
  #[error("Network error: {0}")]
  Network(#[from] reqwest::Error),

  /// Response body is not the expected document
  #[error("Invalid response: {0}")]
  InvalidResponse(#[from] serde_json::Error),

  /// API key cannot be sent as a header value
  #[error("API key is not a valid header value")]
  InvalidApiKey,

  /// Transport could not be constructed
  #[error("Failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

impl ApiError {
  /// Status code of an HTTP error response
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Http { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Whether this error is a transient overload response worth retrying.
  /// Network errors are never treated as overload.
  pub fn is_server_busy(&self, retry: &RetryConfig) -> bool {
    self
      .status()
      .is_some_and(|status| retry.is_retryable_status(status.as_u16()))
  }
}

/// Errors that prevent a benchmark from starting
#[derive(Error, Debug)]
pub enum BenchError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
  use super::*;

  fn http(status: StatusCode) -> ApiError {
    ApiError::Http {
      status,
      body: String::new(),
    }
  }

  #[test]
  fn gateway_statuses_are_server_busy() {
    let retry = RetryConfig::default();
    assert!(http(StatusCode::BAD_GATEWAY).is_server_busy(&retry));
    assert!(http(StatusCode::SERVICE_UNAVAILABLE).is_server_busy(&retry));
    assert!(http(StatusCode::GATEWAY_TIMEOUT).is_server_busy(&retry));
    assert!(!http(StatusCode::BAD_REQUEST).is_server_busy(&retry));
    assert!(!http(StatusCode::INTERNAL_SERVER_ERROR).is_server_busy(&retry));
    assert!(!http(StatusCode::TOO_MANY_REQUESTS).is_server_busy(&retry));
  }

  #[test]
  fn single_status_classification_is_configurable() {
    let retry = RetryConfig {
      retryable_statuses: vec![503],
      ..Default::default()
    };
    assert!(http(StatusCode::SERVICE_UNAVAILABLE).is_server_busy(&retry));
    assert!(!http(StatusCode::BAD_GATEWAY).is_server_busy(&retry));
  }
}
