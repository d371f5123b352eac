// Configuration Types
// All configuration type definitions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://researcher.gtowizard.com";

/// Game played when none is configured
pub const DEFAULT_GAME_NAME: &str = "HUNL 200BB";

/// Largest accepted `retry.max_delay_secs`
pub const MAX_RETRY_DELAY_SECS: f64 = 3600.0;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
  /// Transport settings
  pub api: ApiConfig,
  /// Benchmark run settings
  pub run: RunConfig,
  /// Retry policy for server-busy responses
  pub retry: RetryConfig,
}

impl BenchConfig {
  /// Check cross-field constraints the types cannot express
  pub fn validate(&self) -> Result<()> {
    if self.api.base_url.trim().is_empty() {
      return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
    }
    if self.api.timeout_secs == 0 {
      return Err(ConfigError::Invalid("api.timeout_secs must be positive".to_string()));
    }
    if self.run.max_concurrent_hands == 0 {
      return Err(ConfigError::Invalid(
        "run.max_concurrent_hands must be at least 1".to_string(),
      ));
    }
    let retry = &self.retry;
    if retry.max_attempts == 0 {
      return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
    }
    if !(retry.min_delay_secs >= 0.0
      && retry.min_delay_secs <= retry.base_delay_secs
      && retry.base_delay_secs <= retry.max_delay_secs)
    {
      return Err(ConfigError::Invalid(
        "retry delays must satisfy 0 <= min_delay_secs <= base_delay_secs <= max_delay_secs"
          .to_string(),
      ));
    }
    if retry.max_delay_secs > MAX_RETRY_DELAY_SECS {
      return Err(ConfigError::Invalid(format!(
        "retry.max_delay_secs must not exceed {MAX_RETRY_DELAY_SECS}"
      )));
    }
    Ok(())
  }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
  /// Base address of the hands API
  pub base_url: String,
  /// Per-request timeout in seconds
  pub timeout_secs: u64,
  /// Idle keep-alive connections kept per host. Defaults to the hand
  /// concurrency limit when unset.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pool_max_idle_per_host: Option<usize>,
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout_secs: 180,
      pool_max_idle_per_host: None,
    }
  }
}

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

/// Benchmark run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
  /// Game configuration sent when creating a hand
  pub game_name: String,
  /// Total hands to play
  pub num_hands: usize,
  /// Hands allowed in flight at once
  pub max_concurrent_hands: usize,
  /// Strategy name (`allin` or `checkcall`)
  pub strategy: String,
  /// Abort a hand as failed after this many submitted actions
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_turns: Option<u32>,
  /// Abort a hand as failed after this many seconds
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hand_timeout_secs: Option<u64>,
}

impl RunConfig {
  pub fn hand_timeout(&self) -> Option<Duration> {
    self.hand_timeout_secs.map(Duration::from_secs)
  }
}

impl Default for RunConfig {
  fn default() -> Self {
    Self {
      game_name: DEFAULT_GAME_NAME.to_string(),
      num_hands: 1000,
      max_concurrent_hands: 5,
      strategy: "allin".to_string(),
      max_turns: None,
      hand_timeout_secs: None,
    }
  }
}

// ============================================================================
// RETRY CONFIGURATION
// ============================================================================

/// Backoff settings for transient overload responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
  /// Delay ceiling for the first attempt, doubled on every retry
  pub base_delay_secs: f64,
  /// Upper bound for the doubled delay
  pub max_delay_secs: f64,
  /// Lower bound of the jittered sleep
  pub min_delay_secs: f64,
  /// Total attempts, including the first one
  pub max_attempts: u32,
  /// HTTP statuses treated as "server busy"
  pub retryable_statuses: Vec<u16>,
}

impl RetryConfig {
  /// Whether `status` signals temporary overload.
  pub fn is_retryable_status(&self, status: u16) -> bool {
    self.retryable_statuses.contains(&status)
  }
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      base_delay_secs: 2.0,
      max_delay_secs: 15.0,
      min_delay_secs: 1.0,
      max_attempts: 20,
      retryable_statuses: vec![502, 503, 504],
    }
  }
}
