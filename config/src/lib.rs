// Pokerbench Configuration System
// Layered configuration management

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{ConfigLoader, parse_override};
pub use types::*;
