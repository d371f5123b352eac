use std::time::Duration;

use thiserror::Error;

use crate::error::ApiError;
use crate::strategy::StrategyError;
use crate::types::HandId;

/// Driver state of a single hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPhase {
  /// No hand created yet
  Uninitialized,
  /// Holding a state, deciding the next action
  AwaitingAction,
  /// Action request in flight
  Submitting,
  /// Server reported the hand as over
  Succeeded,
  /// Hand abandoned
  Failed,
}

/// Why a hand was abandoned
#[derive(Error, Debug)]
pub enum HandFailure {
  #[error(transparent)]
  Api(#[from] ApiError),

  #[error("Strategy error: {0}")]
  Strategy(#[from] StrategyError),

  #[error("Hand not over after {0} actions")]
  TurnLimit(u32),

  #[error("Hand not over after {0:?}")]
  TimedOut(Duration),

  #[error("Hand cancelled")]
  Cancelled,

  #[error("Hand task panicked: {0}")]
  TaskPanicked(String),
}

/// Result of one scheduled hand
#[derive(Debug)]
pub struct HandOutcome {
  /// Identifier assigned by the server, if the hand was created
  pub hand_id: Option<HandId>,
  /// Actions accepted by the server
  pub turns: u32,
  /// Terminal phase: [`HandPhase::Succeeded`] or [`HandPhase::Failed`]
  pub phase: HandPhase,
  pub failure: Option<HandFailure>,
}

impl HandOutcome {
  pub fn success(hand_id: HandId, turns: u32) -> Self {
    Self {
      hand_id: Some(hand_id),
      turns,
      phase: HandPhase::Succeeded,
      failure: None,
    }
  }

  pub fn failure(hand_id: Option<HandId>, turns: u32, failure: HandFailure) -> Self {
    Self {
      hand_id,
      turns,
      phase: HandPhase::Failed,
      failure: Some(failure),
    }
  }

  /// Outcome of a hand cancelled before it was created
  pub fn cancelled_before_start() -> Self {
    Self::failure(None, 0, HandFailure::Cancelled)
  }

  pub fn is_success(&self) -> bool {
    self.failure.is_none()
  }
}
