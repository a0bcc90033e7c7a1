//! Storage module for persistent caches and configuration.

pub mod config;
pub mod kv;

pub use config::{load_config, save_config, ConfigError, EngineConfig};
pub use kv::{KeyValueStore, SqliteStore, StoreError};
