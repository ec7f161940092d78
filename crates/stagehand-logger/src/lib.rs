#![forbid(unsafe_code)]

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const LOG_FILE_NAME: &str = "stagehand.log";

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static QUIET: Mutex<bool> = Mutex::new(false);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);
static PROGRESS: Mutex<Option<ProgressBar>> = Mutex::new(None);

const SPINNER_TICKS: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(0)
}

/// Get whether console output beyond errors is suppressed
pub fn is_quiet() -> bool {
    QUIET.lock().ok().map(|v| *v).unwrap_or(false)
}

/// `tracing` filter directive matching the verbosity
/// 0 = warn, 1 = debug (-v), 2+ = trace (-vv); quiet = error
pub fn tracing_level() -> &'static str {
    if is_quiet() {
        return "error";
    }
    match get_verbosity() {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the logger
///
/// The log file lives in `log_dir`, or the stagehand config directory when
/// `None`, and is truncated on every run.
pub fn init_with_verbosity(
    verbosity: u8,
    quiet: bool,
    log_dir: Option<&Path>,
) -> Result<PathBuf, String> {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
    if let Ok(mut q) = QUIET.lock() {
        *q = quiet;
    }

    let dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_config_dir()?,
    };
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let log_file = dir.join(LOG_FILE_NAME);
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut guard = LOG_FILE
        .lock()
        .map_err(|_| "Log file state is poisoned".to_string())?;
    *guard = Some(log_file.clone());
    Ok(log_file)
}

fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("stagehand");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("stagehand");

    Ok(config_dir)
}

fn write_to_log(message: &str) {
    if let Ok(log_file_guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *log_file_guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] {}", timestamp, message);
            }
        }
    }
}

/// Print above any active spinner or progress bar.
fn console(line: &str) {
    let active = PROGRESS
        .lock()
        .ok()
        .and_then(|guard| guard.clone())
        .or_else(|| SPINNER.lock().ok().and_then(|guard| guard.clone()));
    match active {
        Some(bar) => bar.suspend(|| eprintln!("{}", line)),
        None => eprintln!("{}", line),
    }
}

/// Log an informational message (to console if verbose >= 1, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 && !is_quiet() {
        console(message);
    }
}

/// Log a debug message (to console if verbose >= 1, always to file)
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 && !is_quiet() {
        console(&format!("{} {}", "DEBUG:".blue().bold(), message));
    }
}

/// Log a warning message (to both file and console)
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    if !is_quiet() {
        console(&format!("{} {}", "warning:".yellow().bold(), message));
    }
}

/// Log an error message (to both file and console)
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    console(&format!("{} {}", "Error:".red().bold(), message));
}

/// Log a success message
pub fn success(message: &str) {
    write_to_log(&format!("SUCCESS {}", message));
    if !is_quiet() {
        console(&format!("{} {}", "\u{2714}".green().bold(), message));
    }
}

/// Get the log file path for display
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Print the log file path to the user
pub fn show_log_path() {
    match get_log_path() {
        Some(path) => eprintln!("Log file: {}", path.display()),
        None => eprintln!("Log file location not available"),
    }
}

/// Console animations only run when neither verbose nor quiet.
fn animations_enabled() -> bool {
    get_verbosity() == 0 && !is_quiet()
}

/// Start a spinner with the given message
pub fn spinner_start(message: &str) {
    if !animations_enabled() {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(SPINNER_TICKS)
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut spinner_guard) = SPINNER.lock() {
        *spinner_guard = Some(spinner);
    }
}

/// Replace the message of the active spinner
pub fn spinner_message(message: &str) {
    if let Ok(spinner_guard) = SPINNER.lock() {
        if let Some(spinner) = spinner_guard.as_ref() {
            spinner.set_message(message.to_string());
        }
    }
}

fn clear_spinner() {
    if let Ok(mut spinner_guard) = SPINNER.lock() {
        if let Some(spinner) = spinner_guard.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Complete the spinner with a success message
pub fn spinner_success(message: &str) {
    clear_spinner();
    success(message);
}

/// Stop the spinner with an error message
pub fn spinner_error(message: &str) {
    clear_spinner();
    write_to_log(&format!("ERROR {}", message));
    eprintln!("  {} {}", "✗".red().bold(), message);
}

/// Stop the spinner without any message
pub fn spinner_stop() {
    clear_spinner();
}

/// Start a bounded progress bar of `total` steps
pub fn progress_start(total: u64, message: &str) {
    write_to_log(&format!("PROGRESS {} (0/{})", message, total));
    if !animations_enabled() {
        return;
    }

    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {bar:24.cyan/blue} {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(message.to_string());

    if let Ok(mut guard) = PROGRESS.lock() {
        if let Some(previous) = guard.replace(bar) {
            previous.finish_and_clear();
        }
    }
}

/// Move the progress bar to `position` with a new message
pub fn progress_update(position: u64, message: &str) {
    write_to_log(&format!("PROGRESS {} ({})", message, position));
    if let Ok(guard) = PROGRESS.lock() {
        if let Some(bar) = guard.as_ref() {
            bar.set_position(position);
            bar.set_message(message.to_string());
        }
    }
}

/// Remove the progress bar
pub fn progress_finish() {
    if let Ok(mut guard) = PROGRESS.lock() {
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Logger state is global, so everything runs in one test.
    #[test]
    fn test_logger_lifecycle() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOG_FILE_NAME), "stale\n").unwrap();

        let path = init_with_verbosity(1, false, Some(dir.path())).unwrap();
        assert_eq!(path, dir.path().join(LOG_FILE_NAME));
        assert_eq!(get_log_path(), Some(path.clone()));
        assert_eq!(get_verbosity(), 1);
        assert_eq!(tracing_level(), "debug");

        info("opening session");
        warn("settings missing");
        progress_start(2, "plugins");
        progress_update(1, "alpha");
        progress_finish();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("INFO opening session"));
        assert!(content.contains("WARN settings missing"));
        assert!(content.contains("PROGRESS alpha (1)"));

        init_with_verbosity(3, true, Some(dir.path())).unwrap();
        assert!(is_quiet());
        assert_eq!(tracing_level(), "error");
    }
}
