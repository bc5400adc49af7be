pub mod config;
pub mod state;

pub use config::{AppConfig, ConfigError, StoreBackend, StoreConfig};
pub use state::{AppState, StateError};
