//! Core supporting types: configuration and project persistence.

mod config;
mod store;

pub use config::{AiConfig, Config, ExecutorSettings, StorageConfig};
pub use store::{JsonFileStore, MemoryStore, ProjectStore, StoreError};
