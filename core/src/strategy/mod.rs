//! Decision strategies
//!
//! A [`Strategy`] turns the current [`GameState`] into the next [`Action`].
//! Strategies are pure: no I/O, no shared state. The driver calls one once
//! per turn.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pokerbench_config::ConfigError;
use thiserror::Error;

use crate::types::{Action, GameState};

mod allin;
mod checkcall;

pub use allin::AllInStrategy;
pub use checkcall::CheckCallStrategy;

/// Strategy failures. They end the hand as failed.
#[derive(Error, Debug)]
pub enum StrategyError {
  #[error("bet is legal but the state has no raise_range")]
  MissingRaiseRange,

  /// For strategies implemented outside this crate
  #[error("{0}")]
  Other(String),
}

/// Picks the next action for a hand
pub trait Strategy: Send + Sync {
  /// Name used in logs
  fn name(&self) -> &'static str;

  /// Decide the next action from the current state
  fn act(&self, state: &GameState) -> Result<Action, StrategyError>;
}

/// Built-in strategies, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
  AllIn,
  CheckCall,
}

impl StrategyKind {
  pub const ALL: [StrategyKind; 2] = [StrategyKind::AllIn, StrategyKind::CheckCall];

  pub fn name(self) -> &'static str {
    match self {
      StrategyKind::AllIn => "allin",
      StrategyKind::CheckCall => "checkcall",
    }
  }

  pub fn build(self) -> Arc<dyn Strategy> {
    match self {
      StrategyKind::AllIn => Arc::new(AllInStrategy),
      StrategyKind::CheckCall => Arc::new(CheckCallStrategy),
    }
  }
}

impl fmt::Display for StrategyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for StrategyKind {
  type Err = ConfigError;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    let wanted = name.trim().to_lowercase();
    Self::ALL
      .into_iter()
      .find(|kind| kind.name() == wanted)
      .ok_or_else(|| ConfigError::UnknownStrategy {
        name: name.to_string(),
        available: Self::ALL.map(StrategyKind::name).join(", "),
      })
  }
}
