//! Retrying request executor
//!
//! Server-busy responses are expected under high concurrency, so every hands
//! API call runs through [`RetryPolicy::run`]: exponential backoff capped at
//! `max_delay`, with the actual sleep drawn uniformly between `min_delay` and
//! the capped delay to spread concurrent retries apart.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pokerbench_config::RetryConfig;
use rand::Rng;
use tracing::debug;

use crate::error::ApiError;
use crate::types::HandId;

/// Suspends the current task between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
  async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
  async fn sleep(&self, duration: Duration) {
    tokio::time::sleep(duration).await;
  }
}

/// Backoff policy for one logical request
#[derive(Clone)]
pub struct RetryPolicy {
  config: RetryConfig,
  sleeper: Arc<dyn Sleeper>,
}

impl RetryPolicy {
  pub fn new(config: RetryConfig) -> Self {
    Self {
      config,
      sleeper: Arc::new(TokioSleeper),
    }
  }

  /// Replace the sleeper, e.g. to observe waits in tests
  pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
    self.sleeper = sleeper;
    self
  }

  pub fn config(&self) -> &RetryConfig {
    &self.config
  }

  /// `min(base_delay * 2^attempt, max_delay)` for a zero-based attempt index
  pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let secs = (self.config.base_delay_secs * 2f64.powi(exponent)).min(self.config.max_delay_secs);
    // Unrepresentable delays saturate rather than collapse to no wait
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
  }

  /// Jittered sleep for a zero-based attempt index, uniform in
  /// `[min_delay, backoff_ceiling(attempt)]`
  pub fn jittered_delay(&self, attempt: u32) -> Duration {
    let ceiling = self.backoff_ceiling(attempt).as_secs_f64();
    let floor = self.config.min_delay_secs.max(0.0).min(ceiling);
    let secs = if ceiling > floor {
      rand::thread_rng().gen_range(floor..=ceiling)
    } else {
      floor
    };
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
  }

  /// Run `request` until it succeeds, fails with an error `is_retryable`
  /// rejects, or `max_attempts` attempts have been made. The last error is
  /// returned unchanged.
  pub async fn run<T, E, F, Fut, C>(
    &self,
    hand_id: Option<HandId>,
    mut request: F,
    is_retryable: C,
  ) -> Result<T, E>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: Display,
  {
    let max_attempts = self.config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
      let err = match request().await {
        Ok(value) => return Ok(value),
        Err(err) => err,
      };

      if !is_retryable(&err) || attempt + 1 >= max_attempts {
        return Err(err);
      }

      let wait = self.jittered_delay(attempt);
      debug!(
        attempt = attempt + 1,
        hand_id = hand_id.map(HandId::get),
        wait_secs = wait.as_secs_f64(),
        "{err}. Waiting {:.2}s",
        wait.as_secs_f64()
      );
      self.sleeper.sleep(wait).await;
      attempt += 1;
    }
  }

  /// [`run`](Self::run) classifying [`ApiError`]s by the configured
  /// server-busy statuses
  pub async fn run_api<T, F, Fut>(&self, hand_id: Option<HandId>, request: F) -> Result<T, ApiError>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
  {
    let config = &self.config;
    self
      .run(hand_id, request, |err: &ApiError| err.is_server_busy(config))
      .await
  }
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::new(RetryConfig::default())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicU32, Ordering};

  use reqwest::StatusCode;

  use super::*;

  #[derive(Default)]
  struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
  }

  impl RecordingSleeper {
    fn sleeps(&self) -> Vec<Duration> {
      self.sleeps.lock().expect("sleeps lock").clone()
    }
  }

  #[async_trait]
  impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
      self.sleeps.lock().expect("sleeps lock").push(duration);
    }
  }

  fn recording_policy() -> (RetryPolicy, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let policy = RetryPolicy::default().with_sleeper(sleeper.clone());
    (policy, sleeper)
  }

  fn http(status: StatusCode) -> ApiError {
    ApiError::Http {
      status,
      body: "busy".to_string(),
    }
  }

  #[test]
  fn ceiling_doubles_until_capped() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.backoff_ceiling(0), Duration::from_secs(2));
    assert_eq!(policy.backoff_ceiling(1), Duration::from_secs(4));
    assert_eq!(policy.backoff_ceiling(2), Duration::from_secs(8));
    assert_eq!(policy.backoff_ceiling(3), Duration::from_secs(15));
    assert_eq!(policy.backoff_ceiling(19), Duration::from_secs(15));
    assert_eq!(policy.backoff_ceiling(u32::MAX), Duration::from_secs(15));
  }

  #[test]
  fn jitter_stays_within_bounds() {
    let policy = RetryPolicy::default();
    for attempt in 0..25 {
      let ceiling = policy.backoff_ceiling(attempt);
      for _ in 0..50 {
        let wait = policy.jittered_delay(attempt);
        assert!(wait >= Duration::from_secs(1), "{wait:?} below floor");
        assert!(wait <= ceiling, "{wait:?} above {ceiling:?}");
      }
    }
  }

  #[test]
  fn oversized_delays_saturate_instead_of_vanishing() {
    let policy = RetryPolicy::new(RetryConfig {
      max_delay_secs: 1e30,
      ..Default::default()
    });
    assert_eq!(policy.backoff_ceiling(70), Duration::MAX);
    for _ in 0..100 {
      assert!(policy.jittered_delay(70) >= Duration::from_secs(1));
    }
  }

  #[tokio::test]
  async fn succeeds_after_k_server_busy_responses() {
    let (policy, sleeper) = recording_policy();
    let calls = AtomicU32::new(0);
    let k = 7;

    let result = policy
      .run_api(Some(HandId(3)), || {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        async move {
          if call < k {
            Err(http(StatusCode::SERVICE_UNAVAILABLE))
          } else {
            Ok(call)
          }
        }
      })
      .await;

    assert_eq!(result.expect("eventual success"), k);
    assert_eq!(calls.load(Ordering::SeqCst), k + 1);
    let sleeps = sleeper.sleeps();
    assert_eq!(sleeps.len(), k as usize);
    assert!(sleeps.iter().all(|d| *d <= Duration::from_secs(15)));
  }

  #[tokio::test]
  async fn gives_up_after_max_attempts() {
    let (policy, sleeper) = recording_policy();
    let calls = AtomicU32::new(0);

    let result: Result<(), ApiError> = policy
      .run_api(None, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(http(StatusCode::SERVICE_UNAVAILABLE)) }
      })
      .await;

    let err = result.expect_err("exhausted");
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(calls.load(Ordering::SeqCst), 20);
    assert_eq!(sleeper.sleeps().len(), 19);
  }

  #[tokio::test]
  async fn terminal_status_is_not_retried() {
    let (policy, sleeper) = recording_policy();
    let calls = AtomicU32::new(0);

    let result: Result<(), ApiError> = policy
      .run_api(Some(HandId(1)), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(http(StatusCode::BAD_REQUEST)) }
      })
      .await;

    assert_eq!(
      result.expect_err("terminal").status(),
      Some(StatusCode::BAD_REQUEST)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.sleeps().is_empty());
  }

  #[tokio::test]
  async fn custom_classifier_decides_retries() {
    let (policy, sleeper) = recording_policy();
    let calls = AtomicU32::new(0);

    let result: Result<u32, String> = policy
      .run(
        None,
        || {
          let call = calls.fetch_add(1, Ordering::SeqCst);
          async move {
            match call {
              0 => Err("flaky".to_string()),
              1 => Err("fatal".to_string()),
              _ => Ok(call),
            }
          }
        },
        |err: &String| err == "flaky",
      )
      .await;

    assert_eq!(result.expect_err("fatal is terminal"), "fatal");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(sleeper.sleeps().len(), 1);
  }
}
