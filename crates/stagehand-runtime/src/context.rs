//! Per-session runtime state and the open-session pipeline

use crate::errors::RuntimeError;
use crate::plugins::{self, LoadedPlugin, PluginManifest};
use crate::profile::Profile;
use crate::records::{self, RawRecord};
use crate::settings::Settings;
use stagehand_abi::StatusCode;
use stagehand_config::Config;
use std::path::Path;

/// A progress step of [`NativeContext::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    LoadSettings,
    LoadProfile,
    CreateRuntime,
    LoadPlugin {
        name: &'a str,
        index: usize,
        count: usize,
    },
    LoadRecords,
    Loaded,
}

impl Progress<'_> {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::LoadSettings => StatusCode::LOAD_SETTINGS,
            Self::LoadProfile => StatusCode::LOAD_PROFILE,
            Self::CreateRuntime => StatusCode::CREATE_RUNTIME,
            Self::LoadPlugin { .. } => StatusCode::LOAD_PLUGIN,
            Self::LoadRecords => StatusCode::LOAD_RECORDS,
            Self::Loaded => StatusCode::LOADED,
        }
    }
}

/// Everything the runtime keeps for one application handle.
#[derive(Debug, Default)]
pub struct NativeContext {
    app_id: String,
    config: Config,
    settings: Option<Settings>,
    profile: Option<Profile>,
    plugins: Vec<LoadedPlugin>,
    records: Vec<RawRecord>,
}

impl NativeContext {
    pub fn new(app_id: impl Into<String>, config: Config) -> Self {
        Self {
            app_id: app_id.into(),
            config,
            ..Default::default()
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn plugins(&self) -> &[LoadedPlugin] {
        &self.plugins
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Opens the profile at `config_path`, reporting each step to `emit`.
    ///
    /// Settings and records fall back to defaults when they cannot be read. A
    /// profile or plugin directory that cannot be read stops the operation
    /// before `Loaded`.
    pub fn open(
        &mut self,
        config_path: &Path,
        emit: &mut dyn FnMut(Progress<'_>),
    ) -> Result<(), RuntimeError> {
        emit(Progress::LoadSettings);
        let settings = self
            .config
            .settings_dir(&self.app_id)
            .map_err(RuntimeError::from)
            .and_then(|dir| Settings::load(&dir))
            .unwrap_or_else(|e| {
                tracing::warn!("Load settings failed: {}", e);
                Settings::default()
            });
        self.settings = Some(settings);

        emit(Progress::LoadProfile);
        let profile = Profile::load(config_path).inspect_err(|e| {
            tracing::warn!("Load profile failed: {}", e);
        })?;
        tracing::debug!("Loaded profile '{}'", profile.title);

        emit(Progress::CreateRuntime);
        let entries = plugins::discover(&profile, config_path).inspect_err(|e| {
            tracing::warn!("Plugin discovery failed: {}", e);
        })?;
        let count = entries.len();
        let mut loaded = Vec::with_capacity(count);
        for (index, entry) in entries.into_iter().enumerate() {
            emit(Progress::LoadPlugin {
                name: &entry.name,
                index,
                count,
            });
            let manifest = PluginManifest::load(&entry.path)
                .inspect_err(|e| tracing::warn!("Plugin '{}' manifest: {}", entry.name, e))
                .ok();
            loaded.push(LoadedPlugin {
                name: entry.name,
                manifest,
            });
        }
        self.plugins = loaded;

        emit(Progress::LoadRecords);
        self.records = self
            .config
            .records_dir(&self.app_id)
            .map_err(RuntimeError::from)
            .and_then(|dir| records::load_records(&dir.join(&profile.title)))
            .unwrap_or_else(|e| {
                tracing::warn!("Load records failed: {}", e);
                Vec::new()
            });
        self.profile = Some(profile);

        emit(Progress::Loaded);
        Ok(())
    }
}
