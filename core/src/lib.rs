// Pokerbench Core Library

pub mod client;
pub mod error;
pub mod gate;
pub mod hand;
pub mod retry;
pub mod runner;
pub mod strategy;
pub mod types;

pub use client::{HandsApi, HttpHandsApi};
pub use error::{ApiError, BenchError};
pub use gate::{HandGate, HandPermit};
pub use hand::{HandDriver, HandFailure, HandOutcome, HandPhase};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use runner::{BenchmarkRunner, BenchmarkSummary};
pub use strategy::{AllInStrategy, CheckCallStrategy, Strategy, StrategyError, StrategyKind};
pub use types::{Action, ActionKind, GameState, HandId, HandResponse, RaiseRange};
