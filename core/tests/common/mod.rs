#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pokerbench_config::ApiConfig;
use pokerbench_core::{HttpHandsApi, Sleeper};
use serde_json::{Value, json};

pub const API_KEY: &str = "test-key";

/// Returns immediately and remembers every requested wait
#[derive(Default)]
pub struct RecordingSleeper {
  sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
  pub fn sleeps(&self) -> Vec<Duration> {
    self.sleeps.lock().expect("sleeps lock").clone()
  }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
  async fn sleep(&self, duration: Duration) {
    self.sleeps.lock().expect("sleeps lock").push(duration);
  }
}

pub fn instant_sleeper() -> Arc<RecordingSleeper> {
  Arc::new(RecordingSleeper::default())
}

pub fn http_api(base_url: &str) -> Arc<HttpHandsApi> {
  let config = ApiConfig {
    base_url: base_url.to_string(),
    ..Default::default()
  };
  Arc::new(HttpHandsApi::new(&config, API_KEY, 5).expect("http client"))
}

pub fn hand_response(hand_id: i64, game_state: Value) -> Value {
  json!({"hand_id": hand_id, "game_state": game_state})
}

pub fn open_state(legal_actions: Value) -> Value {
  json!({
    "is_hand_over": false,
    "legal_actions": legal_actions,
    "raise_range": {"min": 2, "max": 100},
  })
}

pub fn finished_state() -> Value {
  json!({"is_hand_over": true, "legal_actions": [], "raise_range": null})
}
