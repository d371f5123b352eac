//! Hand driver
//!
//! Plays one hand from creation to a terminal state:
//!
//! ```text
//! Uninitialized --create--> AwaitingAction --strategy--> Submitting
//!                                ^                           |
//!                                +-----------act-------------+
//! AwaitingAction --is_hand_over--> Succeeded
//! any --error/timeout/cancel--> Failed
//! ```
//!
//! Every request goes through the [`RetryPolicy`]; whatever escapes it ends
//! the hand as failed. Session creation is never retried beyond the policy.

mod outcome;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::client::HandsApi;
use crate::error::ApiError;
use crate::retry::RetryPolicy;
use crate::strategy::Strategy;
use crate::types::HandId;

pub use outcome::{HandFailure, HandOutcome, HandPhase};

/// Drives hands against a [`HandsApi`] with a fixed strategy and game
pub struct HandDriver {
  api: Arc<dyn HandsApi>,
  strategy: Arc<dyn Strategy>,
  retry: RetryPolicy,
  game_name: String,
  max_turns: Option<u32>,
  hand_timeout: Option<Duration>,
}

/// Bookkeeping for the hand currently being driven
#[derive(Debug)]
struct HandProgress {
  hand_id: Option<HandId>,
  turns: u32,
  phase: HandPhase,
}

impl HandDriver {
  pub fn new(
    api: Arc<dyn HandsApi>,
    strategy: Arc<dyn Strategy>,
    retry: RetryPolicy,
    game_name: impl Into<String>,
  ) -> Self {
    Self {
      api,
      strategy,
      retry,
      game_name: game_name.into(),
      max_turns: None,
      hand_timeout: None,
    }
  }

  /// Fail a hand once this many actions were accepted without it ending
  pub fn with_max_turns(mut self, max_turns: Option<u32>) -> Self {
    self.max_turns = max_turns;
    self
  }

  /// Fail a hand that has not ended within `timeout`
  pub fn with_hand_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.hand_timeout = timeout;
    self
  }

  pub fn game_name(&self) -> &str {
    &self.game_name
  }

  pub fn strategy_name(&self) -> &'static str {
    self.strategy.name()
  }

  /// Play one hand. Never fails: every error becomes a failed outcome.
  /// Cancelling `cancel` abandons the request in flight.
  pub async fn play(&self, cancel: &CancellationToken) -> HandOutcome {
    self.play_reporting(cancel, &OnceLock::new()).await
  }

  /// [`play`](Self::play), also publishing the hand id to `created` as soon
  /// as the server assigns it. The slot stays readable if the task dies.
  pub async fn play_reporting(
    &self,
    cancel: &CancellationToken,
    created: &OnceLock<HandId>,
  ) -> HandOutcome {
    let mut progress = HandProgress {
      hand_id: None,
      turns: 0,
      phase: HandPhase::Uninitialized,
    };

    let result = {
      let drive = async {
        match self.hand_timeout {
          Some(limit) => tokio::time::timeout(limit, self.drive(&mut progress, created))
            .await
            .unwrap_or(Err(HandFailure::TimedOut(limit))),
          None => self.drive(&mut progress, created).await,
        }
      };
      tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HandFailure::Cancelled),
        result = drive => result,
      }
    };

    match result {
      Ok(hand_id) => {
        debug!(hand_id = hand_id.get(), turns = progress.turns, "Hand finished");
        HandOutcome::success(hand_id, progress.turns)
      }
      Err(failure) => {
        log_failure(&progress, &failure);
        HandOutcome::failure(progress.hand_id, progress.turns, failure)
      }
    }
  }

  async fn drive(
    &self,
    progress: &mut HandProgress,
    created: &OnceLock<HandId>,
  ) -> Result<HandId, HandFailure> {
    let api = self.api.as_ref();
    let game_name = self.game_name.as_str();

    progress.phase = HandPhase::Uninitialized;
    let response = self
      .retry
      .run_api(None, move || api.create_hand(game_name))
      .await?;
    let hand_id = response.hand_id;
    progress.hand_id = Some(hand_id);
    let _ = created.set(hand_id);
    let mut state = response.game_state;

    loop {
      progress.phase = HandPhase::AwaitingAction;
      if state.is_hand_over {
        progress.phase = HandPhase::Succeeded;
        return Ok(hand_id);
      }
      if let Some(limit) = self.max_turns {
        if progress.turns >= limit {
          return Err(HandFailure::TurnLimit(limit));
        }
      }

      let action = self.strategy.act(&state)?;
      trace!(hand_id = hand_id.get(), ?action, "Submitting action");

      progress.phase = HandPhase::Submitting;
      let action = &action;
      let acted = self
        .retry
        .run_api(Some(hand_id), move || api.act(hand_id, action))
        .await?;
      progress.turns += 1;
      state = acted.game_state;
    }
  }
}

fn log_failure(progress: &HandProgress, failure: &HandFailure) {
  let hand_id = progress.hand_id.map(HandId::get);
  let phase = progress.phase;
  match failure {
    HandFailure::Api(ApiError::Http { status, body }) => {
      error!(hand_id, ?phase, %status, "API Error: {body}");
    }
    HandFailure::Cancelled => warn!(hand_id, ?phase, "Hand cancelled"),
    other => error!(hand_id, ?phase, "Unexpected error: {other}"),
  }
}
