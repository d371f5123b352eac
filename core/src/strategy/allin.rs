use crate::types::{Action, ActionKind, GameState};

use super::{Strategy, StrategyError};

/// Bets the maximum whenever betting is legal, otherwise calls, checking
/// only when calling is not offered.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllInStrategy;

impl Strategy for AllInStrategy {
  fn name(&self) -> &'static str {
    "allin"
  }

  fn act(&self, state: &GameState) -> Result<Action, StrategyError> {
    if state.is_legal(ActionKind::Bet) {
      let range = state
        .raise_range
        .as_ref()
        .ok_or(StrategyError::MissingRaiseRange)?;
      return Ok(Action::bet(range.max.clone()));
    }
    if !state.is_legal(ActionKind::Call) && state.is_legal(ActionKind::Check) {
      return Ok(Action::check());
    }
    Ok(Action::call())
  }
}
