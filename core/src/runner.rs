//! Benchmark orchestrator
//!
//! Fans out N hands, each admitted through a [`HandGate`], waits for all of
//! them in completion order and aggregates the outcomes.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use pokerbench_config::BenchConfig;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::client::{HandsApi, HttpHandsApi};
use crate::error::BenchError;
use crate::gate::HandGate;
use crate::hand::{HandDriver, HandFailure, HandOutcome};
use crate::retry::RetryPolicy;
use crate::strategy::{Strategy, StrategyKind};
use crate::types::HandId;

/// Runs batches of hands with bounded concurrency
pub struct BenchmarkRunner {
  driver: Arc<HandDriver>,
  gate: HandGate,
  cancel: CancellationToken,
}

impl BenchmarkRunner {
  pub fn new(driver: HandDriver, max_concurrent_hands: usize) -> Self {
    Self {
      driver: Arc::new(driver),
      gate: HandGate::new(max_concurrent_hands),
      cancel: CancellationToken::new(),
    }
  }

  /// Build a runner over an existing transport and strategy
  pub fn from_parts(
    config: &BenchConfig,
    api: Arc<dyn HandsApi>,
    strategy: Arc<dyn Strategy>,
  ) -> Self {
    let driver = HandDriver::new(
      api,
      strategy,
      RetryPolicy::new(config.retry.clone()),
      config.run.game_name.clone(),
    )
    .with_max_turns(config.run.max_turns)
    .with_hand_timeout(config.run.hand_timeout());
    Self::new(driver, config.run.max_concurrent_hands)
  }

  /// Resolve the configured strategy, then open the HTTP transport. An
  /// unknown strategy fails before any connection is made.
  pub fn from_config(config: &BenchConfig, api_key: &str) -> Result<Self, BenchError> {
    let strategy = config.run.strategy.parse::<StrategyKind>()?.build();
    let api = HttpHandsApi::new(&config.api, api_key, config.run.max_concurrent_hands)?;
    Ok(Self::from_parts(config, Arc::new(api), strategy))
  }

  /// Stop scheduling hands and abandon in-flight requests once `cancel` fires
  pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn gate(&self) -> &HandGate {
    &self.gate
  }

  /// Play `num_hands` hands and wait for every one of them. Individual
  /// failures never stop the batch.
  pub async fn run(&self, num_hands: usize) -> BenchmarkSummary {
    info!(
      strategy = self.driver.strategy_name(),
      "Starting {num_hands} hands on game {}",
      self.driver.game_name()
    );
    let start = Instant::now();

    // Waiters still queued on the gate give up once the run is cancelled
    let closer = {
      let gate = self.gate.clone();
      let cancel = self.cancel.clone();
      tokio::spawn(async move {
        cancel.cancelled().await;
        gate.close();
      })
    };

    let mut outcomes = Vec::with_capacity(num_hands);
    let mut tasks = JoinSet::new();
    let mut created_ids: HashMap<tokio::task::Id, Arc<OnceLock<HandId>>> = HashMap::new();
    for _ in 0..num_hands {
      if self.cancel.is_cancelled() {
        outcomes.push(HandOutcome::cancelled_before_start());
        continue;
      }
      let driver = Arc::clone(&self.driver);
      let gate = self.gate.clone();
      let cancel = self.cancel.clone();
      let created = Arc::new(OnceLock::new());
      let slot = Arc::clone(&created);
      let handle = tasks.spawn(async move { play_gated(&driver, &gate, &cancel, &slot).await });
      created_ids.insert(handle.id(), created);
    }

    let mut progress = ProgressLog::new(num_hands);
    progress.record(outcomes.len());
    while let Some(joined) = tasks.join_next_with_id().await {
      let outcome = match joined {
        Ok((id, outcome)) => {
          created_ids.remove(&id);
          outcome
        }
        Err(e) => {
          let hand_id = created_ids
            .remove(&e.id())
            .and_then(|created| created.get().copied());
          error!(hand_id = hand_id.map(HandId::get), "Hand task failed: {e}");
          HandOutcome::failure(hand_id, 0, HandFailure::TaskPanicked(e.to_string()))
        }
      };
      outcomes.push(outcome);
      progress.record(outcomes.len());
    }
    closer.abort();
    if self.cancel.is_cancelled() {
      self.gate.close();
    }

    let summary = BenchmarkSummary::new(num_hands, outcomes, start.elapsed());
    info!("Benchmark finished");
    info!("{summary}");
    summary
  }
}

async fn play_gated(
  driver: &HandDriver,
  gate: &HandGate,
  cancel: &CancellationToken,
  created: &OnceLock<HandId>,
) -> HandOutcome {
  // A closed gate means the run was cancelled while this hand was queued
  let Ok(permit) = gate.acquire().await else {
    return HandOutcome::cancelled_before_start();
  };

  let outcome = driver.play_reporting(cancel, created).await;
  drop(permit);
  outcome
}

/// Logs completion every tenth of the batch
struct ProgressLog {
  total: usize,
  step: usize,
  next: usize,
}

impl ProgressLog {
  fn new(total: usize) -> Self {
    let step = (total / 10).max(1);
    Self {
      total,
      step,
      next: step,
    }
  }

  fn record(&mut self, completed: usize) {
    if self.total == 0 || completed < self.next {
      return;
    }
    info!(completed, total = self.total, "Playing hands");
    while self.next <= completed {
      self.next += self.step;
    }
  }
}

/// Aggregate result of a benchmark run
#[derive(Debug)]
pub struct BenchmarkSummary {
  pub total_hands: usize,
  pub successful_hands: usize,
  pub failed_hands: usize,
  pub duration: Duration,
  /// One outcome per scheduled hand, in completion order
  pub outcomes: Vec<HandOutcome>,
}

impl BenchmarkSummary {
  pub fn new(total_hands: usize, outcomes: Vec<HandOutcome>, duration: Duration) -> Self {
    let successful_hands = outcomes.iter().filter(|o| o.is_success()).count();
    Self {
      total_hands,
      successful_hands,
      failed_hands: total_hands.saturating_sub(successful_hands),
      duration,
      outcomes,
    }
  }

  /// Wall-clock seconds per scheduled hand, zero for an empty run
  pub fn seconds_per_hand(&self) -> f64 {
    if self.total_hands == 0 {
      0.0
    } else {
      self.duration.as_secs_f64() / self.total_hands as f64
    }
  }
}

impl fmt::Display for BenchmarkSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Successful hands: {}. Failed hands: {}. Average seconds/hand: {:.3}",
      self.successful_hands,
      self.failed_hands,
      self.seconds_per_hand()
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_summary_does_not_divide_by_zero() {
    let summary = BenchmarkSummary::new(0, Vec::new(), Duration::from_secs(3));
    assert_eq!(summary.seconds_per_hand(), 0.0);
    assert_eq!(
      summary.to_string(),
      "Successful hands: 0. Failed hands: 0. Average seconds/hand: 0.000"
    );
  }

  #[test]
  fn failed_counts_every_non_success() {
    let outcomes = vec![
      HandOutcome::success(crate::types::HandId(1), 2),
      HandOutcome::cancelled_before_start(),
      HandOutcome::failure(None, 0, HandFailure::TurnLimit(3)),
      HandOutcome::success(crate::types::HandId(2), 1),
    ];
    let summary = BenchmarkSummary::new(4, outcomes, Duration::from_secs(2));
    assert_eq!(summary.successful_hands, 2);
    assert_eq!(summary.failed_hands, 2);
    assert_eq!(summary.seconds_per_hand(), 0.5);
  }

  #[test]
  fn progress_steps_through_tenths() {
    let mut progress = ProgressLog::new(25);
    assert_eq!(progress.step, 2);
    progress.record(1);
    assert_eq!(progress.next, 2);
    progress.record(5);
    assert_eq!(progress.next, 6);
  }
}
