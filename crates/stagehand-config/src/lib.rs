//! Configuration management for stagehand
//!
//! A single TOML file holds the host's application id and the directories the
//! runtime reads settings and records from. Its location can be overridden
//! with `STAGEHAND_CONFIG` for tests and isolated runs.
#![forbid(unsafe_code)]

mod config;
pub mod errors;

pub use config::{Config, CONFIG_ENV, DEFAULT_APP_ID, POINTER_FILE};
pub use errors::ConfigError;
