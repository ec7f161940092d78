use crate::errors::RuntimeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_plugin_dir() -> String {
    "plugins".to_string()
}

/// The TOML profile passed to `open_session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Plugins to load, in order. Empty means every manifest in `plugin_dir`.
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Plugin directory, relative to the profile file.
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: String,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let content = fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        toml::from_str(&content).map_err(|source| RuntimeError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves `plugin_dir` against the directory containing `profile_path`.
    pub fn plugin_root(&self, profile_path: &Path) -> PathBuf {
        let base = profile_path.parent().unwrap_or_else(|| Path::new(""));
        base.join(&self.plugin_dir)
    }
}
