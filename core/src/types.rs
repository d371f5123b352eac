//! Hands API types
//!
//! Request and response documents exchanged with the hands API. Only the
//! fields the driver and the built-in strategies read are typed; everything
//! else in a game state is preserved as-is in [`GameState::extra`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Server-assigned hand identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandId(pub i64);

impl HandId {
  pub fn get(self) -> i64 {
    self.0
  }
}

impl fmt::Display for HandId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Body of `POST /hands`
#[derive(Debug, Clone, Serialize)]
pub struct CreateHandRequest<'a> {
  pub game_name: &'a str,
}

/// Response of both `POST /hands` and `POST /hands/{id}/act`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandResponse {
  pub hand_id: HandId,
  pub game_state: GameState,
}

/// Observable state of a hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
  /// Terminal flag; the driver stops once this is true
  pub is_hand_over: bool,

  /// Action kinds the server accepts right now
  #[serde(default)]
  pub legal_actions: Vec<ActionKind>,

  /// Bet/raise bounds, absent when no bet is possible
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub raise_range: Option<RaiseRange>,

  /// Remaining fields, kept opaque
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl GameState {
  pub fn is_legal(&self, kind: ActionKind) -> bool {
    self.legal_actions.contains(&kind)
  }
}

/// Inclusive bet/raise bounds. Numbers are kept exactly as the server sent
/// them so an all-in echoes the same representation back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaiseRange {
  pub min: Number,
  pub max: Number,
}

/// Action kinds on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
  #[serde(rename = "k")]
  Check,
  #[serde(rename = "c")]
  Call,
  #[serde(rename = "b")]
  Bet,
  /// A kind this client never submits
  #[serde(other)]
  Other,
}

/// Body of `POST /hands/{id}/act`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
  #[serde(rename = "action")]
  pub kind: ActionKind,

  /// Present only for bets and raises
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub amount: Option<Number>,
}

impl Action {
  pub fn check() -> Self {
    Self {
      kind: ActionKind::Check,
      amount: None,
    }
  }

  pub fn call() -> Self {
    Self {
      kind: ActionKind::Call,
      amount: None,
    }
  }

  pub fn bet(amount: Number) -> Self {
    Self {
      kind: ActionKind::Bet,
      amount: Some(amount),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[test]
  fn game_state_keeps_unknown_fields() {
    let state: GameState = serde_json::from_value(json!({
      "is_hand_over": false,
      "legal_actions": ["b", "c", "f"],
      "raise_range": {"min": 2, "max": 100},
      "pot": 3.5,
    }))
    .expect("valid state");

    assert_eq!(
      state.legal_actions,
      vec![ActionKind::Bet, ActionKind::Call, ActionKind::Other]
    );
    assert_eq!(state.extra.get("pot"), Some(&json!(3.5)));
  }

  #[test]
  fn null_raise_range_is_absent() {
    let state: GameState = serde_json::from_value(json!({
      "is_hand_over": true,
      "raise_range": null,
    }))
    .expect("valid state");

    assert!(state.raise_range.is_none());
    assert!(state.legal_actions.is_empty());
  }

  #[test]
  fn missing_terminal_flag_is_rejected() {
    let result: Result<GameState, _> = serde_json::from_value(json!({"legal_actions": ["k"]}));
    assert!(result.is_err());
  }

  #[test]
  fn actions_serialize_to_wire_shape() {
    assert_eq!(
      serde_json::to_value(Action::bet(Number::from(100))).expect("serialize"),
      json!({"action": "b", "amount": 100})
    );
    assert_eq!(
      serde_json::to_value(Action::check()).expect("serialize"),
      json!({"action": "k"})
    );
  }
}
