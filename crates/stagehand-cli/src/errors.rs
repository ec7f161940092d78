//! Error types for the stagehand CLI

use stagehand_bridge::BridgeError;
use stagehand_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Profile not found: {}", .0.display())]
    ProfileNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ProfileNotFound(_) => 2,
            CliError::Config(ConfigError::UnknownKey(_)) => 2,
            CliError::Config(_) => 1,
            CliError::Bridge(e) => e.exit_code(),
        }
    }
}
