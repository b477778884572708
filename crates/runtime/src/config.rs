use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "fprop";
pub const PROGRAM_LOG_LEVEL: &str = "FPROP_LOG_LEVEL";

/// Overrides the settings file location when set.
pub const SETTINGS_ENV: &str = "FPROP_SETTINGS";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Namespace every recognized setting key lives under.
pub const CONFIGURATION_SECTION: &str = "file-properties";

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(xdg_var)
        && !dir.is_empty()
    {
        PathBuf::from(dir)
    } else {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(home_suffix)
    }
}

pub fn fprop_config_dir() -> PathBuf {
    // dirs knows the per-platform answer (AppData, Library/Application Support);
    // the XDG fallback only matters when it cannot find a home directory.
    dirs::config_dir()
        .unwrap_or_else(|| xdg_or_home("XDG_CONFIG_HOME", ".config"))
        .join(PROGRAM_NAME)
}

/// Default settings file path, honouring `FPROP_SETTINGS`.
pub fn default_settings_path() -> PathBuf {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => fprop_config_dir().join(SETTINGS_FILE_NAME),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
