//! Plugin discovery
//!
//! A plugin is described by a `<name>.toml` manifest inside the profile's
//! plugin directory. The runtime only reads manifests; it does not execute
//! anything.

use crate::errors::RuntimeError;
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_EXTENSION: &str = "toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PluginManifest {
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let content = fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        toml::from_str(&content).map_err(|source| RuntimeError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A plugin found on disk, before its manifest is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    pub name: String,
    pub path: PathBuf,
}

/// A plugin after loading. `manifest` is `None` when it failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPlugin {
    pub name: String,
    pub manifest: Option<PluginManifest>,
}

/// Lists the plugins to load for `profile`.
///
/// With an explicit list, names without a manifest are skipped. Otherwise
/// every manifest in the plugin directory is used, sorted by name.
pub fn discover(profile: &Profile, profile_path: &Path) -> Result<Vec<PluginEntry>, RuntimeError> {
    let root = profile.plugin_root(profile_path);

    if !profile.plugins.is_empty() {
        let mut entries = Vec::with_capacity(profile.plugins.len());
        for name in &profile.plugins {
            let path = root.join(format!("{name}.{MANIFEST_EXTENSION}"));
            if path.is_file() {
                entries.push(PluginEntry {
                    name: name.clone(),
                    path,
                });
            } else {
                tracing::warn!("Plugin '{}' has no manifest at {}", name, path.display());
            }
        }
        return Ok(entries);
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&root).map_err(|e| RuntimeError::io(&root, e))? {
        let path = entry.map_err(|e| RuntimeError::io(&root, e))?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(MANIFEST_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
            continue;
        };
        entries.push(PluginEntry { name, path });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
