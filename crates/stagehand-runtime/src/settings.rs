use crate::errors::RuntimeError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.json";

/// User settings shared by every profile of one application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display language tag.
    pub lang: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
        }
    }
}

impl Settings {
    /// Reads `settings.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, RuntimeError> {
        let path = dir.join(SETTINGS_FILE);
        let buffer = fs::read(&path).map_err(|e| RuntimeError::io(&path, e))?;
        serde_json::from_slice(&buffer).map_err(|source| RuntimeError::Json { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{ "lang": "ja" }"#).unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.lang, "ja");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{}").unwrap();
        assert_eq!(Settings::load(dir.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert!(matches!(err, RuntimeError::Io { .. }));
    }
}
