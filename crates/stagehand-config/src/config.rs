use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "STAGEHAND_CONFIG";

/// Pointer file next to the default config; its content is the real config path.
pub const POINTER_FILE: &str = ".stagehand_config_path";

/// Application id used when none is configured.
pub const DEFAULT_APP_ID: &str = "io.stagehand.host";

const KEYS: [&str; 4] = ["app-id", "settings-dir", "records-dir", "log-dir"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl Config {
    /// Location of the config file.
    ///
    /// `STAGEHAND_CONFIG` wins when set and non-empty. Otherwise a pointer
    /// file next to the default location may redirect it.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let pointer = Self::pointer_path()?;
        if pointer.exists() {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(PathBuf::from(trimmed));
                }
            }
        }

        Ok(stagehand_config_dir()?.join("stagehand.toml"))
    }

    /// Location of the pointer file consulted by [`Config::path`].
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        Ok(stagehand_config_dir()?.join(POINTER_FILE))
    }

    /// Redirects [`Config::path`] to `target` by writing the pointer file.
    ///
    /// `STAGEHAND_CONFIG` still takes precedence.
    pub fn set_pointer(target: &Path) -> Result<PathBuf, ConfigError> {
        let pointer = Self::pointer_path()?;
        let write_err = |source| ConfigError::Write {
            path: pointer.clone(),
            source,
        };
        if let Some(parent) = pointer.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&pointer, target.to_string_lossy().as_bytes()).map_err(write_err)?;
        Ok(pointer)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Reads `path`, returning defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)
    }

    /// Value of `key`, `None` when unset.
    pub fn get(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        let slot = match key {
            "app-id" => &self.app_id,
            "settings-dir" => &self.settings_dir,
            "records-dir" => &self.records_dir,
            "log-dir" => &self.log_dir,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(slot.as_deref())
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        let slot = match key {
            "app-id" => &mut self.app_id,
            "settings-dir" => &mut self.settings_dir,
            "records-dir" => &mut self.records_dir,
            "log-dir" => &mut self.log_dir,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        *slot = Some(value);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.app_id.is_none()
            && self.settings_dir.is_none()
            && self.records_dir.is_none()
            && self.log_dir.is_none()
    }

    /// Every key that has a value, in a stable order.
    pub fn values_iter(&self) -> Vec<(&'static str, &str)> {
        KEYS.iter()
            .filter_map(|key| Some((*key, self.get(key).ok()??)))
            .collect()
    }

    pub fn app_id(&self) -> &str {
        match self.app_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => DEFAULT_APP_ID,
        }
    }

    /// Directory holding `settings.json` for `app_id`.
    pub fn settings_dir(&self, app_id: &str) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.settings_dir {
            return Ok(PathBuf::from(dir));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoPlatformDir("config"))?;
        Ok(base.join(app_id))
    }

    /// Directory holding one record folder per profile title for `app_id`.
    pub fn records_dir(&self, app_id: &str) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.records_dir {
            return Ok(PathBuf::from(dir));
        }
        let base = dirs::data_local_dir().ok_or(ConfigError::NoPlatformDir("local data"))?;
        Ok(base.join(app_id).join("save"))
    }

    /// Directory for the host's log file.
    pub fn log_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => stagehand_config_dir(),
        }
    }
}

fn stagehand_config_dir() -> Result<PathBuf, ConfigError> {
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir()
        .map(|home| home.join(".config"))
        .ok_or(ConfigError::NoPlatformDir("home"))?;

    #[cfg(target_os = "windows")]
    let base = dirs::config_dir().ok_or(ConfigError::NoPlatformDir("config"))?;

    Ok(base.join("stagehand"))
}
