use crate::errors::CliError;
use crate::sink::ConsoleSink;
use colored::Colorize;
use stagehand_bridge::{OpenSummary, RuntimeApi, SessionBridge};
use stagehand_logger as logger;
use std::path::Path;

/// Opens the session described by `profile` and returns the exit code.
///
/// The runtime resolves its own directories from the stagehand config; only
/// the application id is passed across.
pub fn handle_open(profile: &Path, app_id: &str) -> Result<i32, CliError> {
    open_with(stagehand_runtime::api(), profile, app_id)
}

/// [`handle_open`] against an arbitrary runtime.
pub fn open_with(api: RuntimeApi, profile: &Path, app_id: &str) -> Result<i32, CliError> {
    if !profile.is_file() {
        return Err(CliError::ProfileNotFound(profile.to_path_buf()));
    }

    logger::debug(&format!("Application id: {}", app_id));
    let bridge = SessionBridge::new(api, app_id);

    logger::spinner_start(&format!("Opening {}", profile.display()));
    let result = bridge.start(|session| match session.open_session(profile, &ConsoleSink) {
        Ok(summary) => {
            logger::spinner_success(&loaded_message(&summary));
            0
        }
        Err(e) => {
            logger::progress_finish();
            logger::spinner_error(&e.to_string());
            1
        }
    });
    logger::spinner_stop();
    result.map_err(CliError::from)
}

fn loaded_message(summary: &OpenSummary) -> String {
    match summary.plugins.len() {
        0 => "Session loaded".to_string(),
        n => format!(
            "Session loaded with {} plugin{}: {}",
            n.to_string().bold(),
            if n == 1 { "" } else { "s" },
            summary.plugins.join(", ")
        ),
    }
}
