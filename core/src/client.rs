//! Hands API transport
//!
//! Connection-pooled HTTP client for the hands API. Every method performs
//! exactly one HTTP request; retries are layered on top by
//! [`RetryPolicy`](crate::retry::RetryPolicy).

use async_trait::async_trait;
use pokerbench_config::ApiConfig;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{ApiError, Result};
use crate::types::{Action, CreateHandRequest, HandId, HandResponse};

/// Header carrying the static credential
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Operations the hand driver needs from the remote service
#[async_trait]
pub trait HandsApi: Send + Sync {
  /// `POST /hands`
  async fn create_hand(&self, game_name: &str) -> Result<HandResponse>;

  /// `POST /hands/{hand_id}/act`
  async fn act(&self, hand_id: HandId, action: &Action) -> Result<HandResponse>;
}

/// reqwest-backed [`HandsApi`]
#[derive(Debug, Clone)]
pub struct HttpHandsApi {
  client: Client,
  base_url: String,
}

impl HttpHandsApi {
  /// Build the transport. The pool keeps at most `pool_max_idle_per_host`
  /// idle connections, defaulting to the hand concurrency limit.
  pub fn new(config: &ApiConfig, api_key: &str, max_concurrent_hands: usize) -> Result<Self> {
    let mut api_key = HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidApiKey)?;
    api_key.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, api_key);

    let client = Client::builder()
      .default_headers(headers)
      .timeout(config.timeout())
      .pool_max_idle_per_host(
        config
          .pool_max_idle_per_host
          .unwrap_or(max_concurrent_hands),
      )
      .build()
      .map_err(ApiError::Client)?;

    Ok(Self {
      client,
      base_url: config.base_url.clone(),
    })
  }

  /// Get the API endpoint URL
  fn endpoint(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  /// POST a JSON body and decode a JSON response. Non-2xx statuses become
  /// [`ApiError::Http`] carrying the response body.
  pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
  where
    B: Serialize + ?Sized + Sync,
    R: DeserializeOwned,
  {
    let url = self.endpoint(path);
    trace!(%url, "POST");

    let response = self.client.post(&url).json(body).send().await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ApiError::Http { status, body });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

#[async_trait]
impl HandsApi for HttpHandsApi {
  async fn create_hand(&self, game_name: &str) -> Result<HandResponse> {
    self
      .post_json("hands", &CreateHandRequest { game_name })
      .await
  }

  async fn act(&self, hand_id: HandId, action: &Action) -> Result<HandResponse> {
    self
      .post_json(&format!("hands/{hand_id}/act"), action)
      .await
  }
}
