/*
 * Settings that shape how dialog requests are serviced: the native path
 * limit used for selection buffers and decoded paths, the name prefix of
 * worker threads, an optional per-request allocation limit, and the log
 * level of the demo binary.
 *
 * Settings are stored as JSON in the application's local configuration
 * directory. `SettingsManagerOperations` abstracts the storage so callers and
 * tests can substitute their own location. A missing or empty file yields the
 * defaults.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SETTINGS_FILENAME: &str = "dialog_settings.json";

/// Native path-length limit (`MAX_PATH`) in UTF-16 code units.
pub const DEFAULT_PATH_LIMIT: usize = 260;

// Smallest limit that still holds a drive root and its terminator.
const MIN_PATH_LIMIT: usize = 4;

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    NoProjectDirectory,
    Parse(serde_json::Error),
}

impl From<io::Error> for SettingsError {
    fn from(err: io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Parse(err)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Settings I/O error: {e}"),
            SettingsError::NoProjectDirectory => {
                write!(f, "Could not determine directory for dialog settings")
            }
            SettingsError::Parse(e) => write!(f, "Settings file is not valid JSON: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogSettings {
    pub path_limit: usize,
    pub worker_name_prefix: String,
    pub allocation_limit: Option<usize>,
    pub log_level: String,
}

impl Default for DialogSettings {
    fn default() -> Self {
        DialogSettings {
            path_limit: DEFAULT_PATH_LIMIT,
            worker_name_prefix: "dialog-worker".to_string(),
            allocation_limit: None,
            log_level: "info".to_string(),
        }
    }
}

impl DialogSettings {
    /*
     * Replaces values that cannot work with their defaults, logging each
     * replacement.
     */
    pub fn validated(mut self) -> Self {
        if self.path_limit < MIN_PATH_LIMIT {
            log::warn!(
                "DialogSettings: path_limit {} is too small, using {DEFAULT_PATH_LIMIT}.",
                self.path_limit
            );
            self.path_limit = DEFAULT_PATH_LIMIT;
        }
        if self.worker_name_prefix.trim().is_empty() {
            log::warn!("DialogSettings: Empty worker_name_prefix, using default.");
            self.worker_name_prefix = DialogSettings::default().worker_name_prefix;
        }
        self
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!(
                "DialogSettings: Unknown log level '{}', using Info.",
                self.log_level
            );
            log::LevelFilter::Info
        })
    }
}

pub trait SettingsManagerOperations: Send + Sync {
    fn load_settings(&self, app_name: &str) -> Result<DialogSettings>;
    fn save_settings(&self, app_name: &str, settings: &DialogSettings) -> Result<()>;
}

/*
 * File-backed settings storage. By default the file lives in the directory
 * `path_utils::settings_dir` derives from the application name; `in_directory`
 * pins it to a fixed directory instead.
 */
#[derive(Debug, Default)]
pub struct CoreSettingsManager {
    directory: Option<PathBuf>,
}

impl CoreSettingsManager {
    pub fn new() -> Self {
        CoreSettingsManager { directory: None }
    }

    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        CoreSettingsManager {
            directory: Some(directory.into()),
        }
    }

    fn settings_file(&self, app_name: &str) -> Result<PathBuf> {
        let dir = match &self.directory {
            Some(dir) => dir.clone(),
            None => path_utils::settings_dir(app_name).ok_or(SettingsError::NoProjectDirectory)?,
        };
        Ok(dir.join(SETTINGS_FILENAME))
    }
}

fn read_settings_file(file_path: &Path) -> Result<DialogSettings> {
    let contents = fs::read_to_string(file_path)?;
    if contents.trim().is_empty() {
        log::debug!("CoreSettingsManager: Settings file {file_path:?} is empty.");
        return Ok(DialogSettings::default());
    }
    let settings: DialogSettings = serde_json::from_str(&contents)?;
    Ok(settings.validated())
}

impl SettingsManagerOperations for CoreSettingsManager {
    fn load_settings(&self, app_name: &str) -> Result<DialogSettings> {
        log::trace!("CoreSettingsManager: Loading settings for app '{app_name}'");
        let file_path = self.settings_file(app_name)?;
        if !file_path.exists() {
            log::debug!("CoreSettingsManager: No settings file at {file_path:?}, using defaults.");
            return Ok(DialogSettings::default());
        }
        let settings = read_settings_file(&file_path)?;
        log::debug!("CoreSettingsManager: Loaded settings from {file_path:?}: {settings:?}");
        Ok(settings)
    }

    fn save_settings(&self, app_name: &str, settings: &DialogSettings) -> Result<()> {
        let file_path = self.settings_file(app_name)?;
        if let Some(dir) = file_path.parent() {
            path_utils::ensure_dir(dir)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&file_path, json)?;
        log::debug!("CoreSettingsManager: Saved settings to {file_path:?}.");
        Ok(())
    }
}
