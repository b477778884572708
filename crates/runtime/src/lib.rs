mod config;
pub mod logging;
pub mod settings;

pub use config::{
    CONFIGURATION_SECTION, PROGRAM_LOG_LEVEL, PROGRAM_NAME, SETTINGS_ENV, SETTINGS_FILE_NAME,
    default_settings_path, fprop_config_dir, xdg_or_home,
};

pub use logging::init;
pub use settings::{
    Alignment, ConfigStore, Configuration, InMemorySettings, ListenerId, Platform, SettingsFile,
    SettingsSource, SizeUnit, affects_configuration,
};
