use crate::types::{Action, ActionKind, GameState};

use super::{Strategy, StrategyError};

/// Checks when possible, otherwise calls. Never bets.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckCallStrategy;

impl Strategy for CheckCallStrategy {
  fn name(&self) -> &'static str {
    "checkcall"
  }

  fn act(&self, state: &GameState) -> Result<Action, StrategyError> {
    if state.is_legal(ActionKind::Check) {
      Ok(Action::check())
    } else {
      Ok(Action::call())
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn act(legal: serde_json::Value) -> Action {
    let state: GameState =
      serde_json::from_value(json!({"is_hand_over": false, "legal_actions": legal}))
        .expect("valid state");
    CheckCallStrategy.act(&state).expect("action")
  }

  #[test]
  fn prefers_check_over_call() {
    assert_eq!(act(json!(["k", "c"])), Action::check());
    assert_eq!(act(json!(["c", "b", "k"])), Action::check());
  }

  #[test]
  fn calls_otherwise() {
    assert_eq!(act(json!(["c", "b"])), Action::call());
    assert_eq!(act(json!([])), Action::call());
  }
}
