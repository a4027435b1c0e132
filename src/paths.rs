//! Centralized path resolution for platform-appropriate user data directories.
//!
//! In development mode (cargo run), paths resolve to local directories.
//! In installed mode, paths resolve to platform-specific locations:
//! - Windows: `%APPDATA%\Atlasforged\`
//! - macOS: `~/Library/Application Support/Atlasforged/`
//! - Linux: `~/.config/atlasforged/` (config), `~/.local/share/atlasforged/` (data)

use std::path::{Path, PathBuf};

/// Returns true when running in development mode (cargo run).
///
/// Detection methods:
/// - `CARGO` env var is set (cargo run sets this)
/// - Debug assertions enabled (debug builds)
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

/// Platform-appropriate config directory.
pub fn config_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|p| p.join("atlasforged"))
    }

    #[cfg(not(target_os = "linux"))]
    {
        data_dir()
    }
}

/// Platform-appropriate data directory.
pub fn data_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    dirs::data_dir().map(|p| p.join("atlasforged"))
}

/// Path to the config file.
///
/// - Dev mode: `./config.json`
/// - Installed: `{config_dir}/config.json`
pub fn config_file() -> PathBuf {
    config_dir()
        .map(|p| p.join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Path to the logs directory.
///
/// - Dev mode: `./logs/`
/// - Installed: `{data_dir}/logs/`
pub fn logs_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Bevy's asset folder: `./assets/` in dev mode, next to the executable otherwise.
fn bundled_assets_dir() -> PathBuf {
    if is_dev_mode() {
        return PathBuf::from("assets");
    }

    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.join("assets")))
        .unwrap_or_else(|| PathBuf::from("assets"))
}

/// Ensure all required directories exist.
///
/// Called early in startup to create config and data directories.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(logs_dir())?;
    if let Some(config) = config_dir() {
        std::fs::create_dir_all(&config)?;
    }
    Ok(())
}

/// Path for Bevy's asset server: relative to the asset folder when the file
/// lives inside it, otherwise absolute. Relative config paths are taken
/// from the config directory.
pub fn asset_load_path(path: &Path) -> PathBuf {
    let resolved = if path.is_relative() {
        config_dir().unwrap_or_default().join(path)
    } else {
        path.to_path_buf()
    };

    let Ok(canonical_path) = resolved.canonicalize() else {
        return resolved;
    };
    bundled_assets_dir()
        .canonicalize()
        .ok()
        .and_then(|assets| canonical_path.strip_prefix(&assets).ok().map(Path::to_path_buf))
        .unwrap_or(canonical_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_not_none() {
        // In test mode (debug), should return Some
        assert!(config_dir().is_some());
    }

    #[test]
    fn test_config_file_has_json_extension() {
        let path = config_file();
        assert!(path.to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn test_dev_mode_returns_local_paths() {
        // In tests, is_dev_mode() should be true due to debug_assertions
        assert!(is_dev_mode());
        assert_eq!(config_dir(), Some(PathBuf::from(".")));
        assert_eq!(data_dir(), Some(PathBuf::from(".")));
        assert_eq!(logs_dir(), PathBuf::from("./logs"));
    }

    #[test]
    fn test_missing_asset_path_left_as_resolved() {
        let path = asset_load_path(Path::new("no_such_dir/map.png"));
        assert_eq!(path, PathBuf::from("./no_such_dir/map.png"));
    }

    #[test]
    fn test_absolute_asset_path_kept() {
        let dir = std::env::temp_dir();
        let path = asset_load_path(&dir);
        assert!(path.is_absolute());
    }
}
