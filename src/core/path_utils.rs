/*
 * Locates the per-user directory the bridge keeps its settings in. The
 * directory is derived from `directories::ProjectDirs` without an
 * organization qualifier (e.g. `AppData/Local/<app>/config` on Windows).
 */
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*
 * Returns the local (non-roaming) configuration directory for `app_name`,
 * or `None` if the platform offers no home directory to derive it from.
 * The directory is not created.
 */
pub fn settings_dir(app_name: &str) -> Option<PathBuf> {
    let dir = ProjectDirs::from("", "", app_name).map(|dirs| dirs.config_local_dir().to_path_buf());
    log::trace!("PathUtils: Settings directory for '{app_name}' is {dir:?}");
    dir
}

/*
 * Creates `dir` (and its parents) if it does not exist yet.
 */
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).inspect_err(|e| {
        log::error!("PathUtils: Failed to create directory {dir:?}: {e}");
    })?;
    log::debug!("PathUtils: Created directory {dir:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_dir_mentions_app_name() {
        let app_name = format!("TestApp_PathUtils_{}", rand::random::<u64>());

        // ProjectDirs depends on the environment; only check when it resolves.
        if let Some(dir) = settings_dir(&app_name) {
            assert!(
                dir.to_string_lossy()
                    .to_lowercase()
                    .contains(&app_name.to_lowercase())
            );
            assert!(!dir.exists(), "Looking up the directory must not create it");
        }
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();

        assert!(nested.is_dir());
    }
}
