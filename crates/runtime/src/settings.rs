use std::{
    fmt, fs, io,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use log::{debug, error, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::CONFIGURATION_SECTION;

pub const DEFAULT_TIME_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

/// Setting keys, relative to [`CONFIGURATION_SECTION`].
pub mod keys {
    pub const STATUS_BAR_ALIGNMENT: &str = "statusBarAlignment";
    pub const SHOW_PERMISSIONS: &str = "showPermissionsInStatusBar";
    pub const SHOW_SIZE: &str = "showSizeInStatusBar";
    pub const SHOW_ATIME: &str = "showATimeInStatusBar";
    pub const SHOW_MTIME: &str = "showMTimeInStatusBar";
    pub const SHOW_CTIME: &str = "showCTimeInStatusBar";
    pub const SIZE_UNIT: &str = "sizeUnit";
    pub const TIME_FORMAT: &str = "timeFormat";

    pub const ALL: &[&str] = &[
        STATUS_BAR_ALIGNMENT,
        SHOW_PERMISSIONS,
        SHOW_SIZE,
        SHOW_ATIME,
        SHOW_MTIME,
        SHOW_CTIME,
        SIZE_UNIT,
        TIME_FORMAT,
    ];
}

/// Which side of the status bar the summary lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Alignment {
    Left,
    #[default]
    Right,
}

impl Alignment {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }
}

/// Byte-scaling convention for sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Decimal, 1000-based (`KB`, `MB`, ...).
    Si,
    /// Binary, 1024-based (`KiB`, `MiB`, ...).
    #[default]
    Iec,
}

impl SizeUnit {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("si") {
            Some(Self::Si)
        } else if s.eq_ignore_ascii_case("iec") {
            Some(Self::Iec)
        } else {
            None
        }
    }
}

/// Host operating systems with their own defaults. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    /// Windows has no POSIX permission bits worth showing.
    fn shows_permissions_by_default(self) -> bool {
        match self {
            Self::Windows => false,
            Self::MacOs | Self::Linux | Self::Other => true,
        }
    }
}

/// Merged view of user settings over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub status_bar_alignment: Alignment,
    pub show_permissions_in_status_bar: bool,
    pub show_size_in_status_bar: bool,
    #[serde(rename = "showATimeInStatusBar")]
    pub show_atime_in_status_bar: bool,
    #[serde(rename = "showMTimeInStatusBar")]
    pub show_mtime_in_status_bar: bool,
    #[serde(rename = "showCTimeInStatusBar")]
    pub show_ctime_in_status_bar: bool,
    pub size_unit: SizeUnit,
    pub time_format: String,
}

impl Configuration {
    pub fn defaults_for(platform: Platform) -> Self {
        Self {
            status_bar_alignment: Alignment::Right,
            show_permissions_in_status_bar: platform.shows_permissions_by_default(),
            show_size_in_status_bar: true,
            show_atime_in_status_bar: false,
            show_mtime_in_status_bar: true,
            show_ctime_in_status_bar: false,
            size_unit: SizeUnit::Iec,
            time_format: DEFAULT_TIME_FORMAT.to_owned(),
        }
    }

    /// Merge persisted values over the defaults for `platform`.
    ///
    /// Values of the wrong type are reported and ignored, never fatal.
    pub fn from_values(values: &Map<String, Value>, platform: Platform) -> Self {
        let defaults = Self::defaults_for(platform);

        Self {
            status_bar_alignment: read_enum(values, keys::STATUS_BAR_ALIGNMENT, Alignment::parse)
                .unwrap_or(defaults.status_bar_alignment),
            show_permissions_in_status_bar: read_bool(values, keys::SHOW_PERMISSIONS)
                .unwrap_or(defaults.show_permissions_in_status_bar),
            show_size_in_status_bar: read_bool(values, keys::SHOW_SIZE)
                .unwrap_or(defaults.show_size_in_status_bar),
            show_atime_in_status_bar: read_bool(values, keys::SHOW_ATIME)
                .unwrap_or(defaults.show_atime_in_status_bar),
            show_mtime_in_status_bar: read_bool(values, keys::SHOW_MTIME)
                .unwrap_or(defaults.show_mtime_in_status_bar),
            show_ctime_in_status_bar: read_bool(values, keys::SHOW_CTIME)
                .unwrap_or(defaults.show_ctime_in_status_bar),
            size_unit: read_enum(values, keys::SIZE_UNIT, SizeUnit::parse)
                .unwrap_or(defaults.size_unit),
            time_format: read_str(values, keys::TIME_FORMAT)
                .map(str::to_owned)
                .unwrap_or(defaults.time_format),
        }
    }
}

/// Whether a changed section touches the `file-properties` namespace.
///
/// Hosts report the namespace itself, one of its dotted keys, or an empty
/// section when every setting may have changed.
pub fn affects_configuration(section: &str) -> bool {
    section.is_empty()
        || section == CONFIGURATION_SECTION
        || section
            .strip_prefix(CONFIGURATION_SECTION)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Look up `key`, flat (`file-properties.key`) first, then nested.
///
/// An explicit `null` counts as unset.
fn setting<'a>(values: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let flat = format!("{CONFIGURATION_SECTION}.{key}");
    values
        .get(&flat)
        .or_else(|| {
            values
                .get(CONFIGURATION_SECTION)
                .and_then(Value::as_object)
                .and_then(|section| section.get(key))
        })
        .filter(|v| !v.is_null())
}

fn read_bool(values: &Map<String, Value>, key: &str) -> Option<bool> {
    let value = setting(values, key)?;
    let b = value.as_bool();
    if b.is_none() {
        warn!("Ignoring {CONFIGURATION_SECTION}.{key}: expected a boolean, got {value}");
    }
    b
}

fn read_str<'a>(values: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    let value = setting(values, key)?;
    let s = value.as_str();
    if s.is_none() {
        warn!("Ignoring {CONFIGURATION_SECTION}.{key}: expected a string, got {value}");
    }
    s
}

fn read_enum<T>(
    values: &Map<String, Value>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = read_str(values, key)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Ignoring {CONFIGURATION_SECTION}.{key}: unrecognized value {raw:?}");
    }
    parsed
}

/// Where persisted settings come from.
pub trait SettingsSource {
    /// Current persisted key/value pairs. Unreadable sources yield an empty map.
    fn read(&self) -> Map<String, Value>;
}

/// JSON settings file, re-read on every load.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_read(&self) -> io::Result<Map<String, Value>> {
        let text = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&text).map_err(io::Error::other)? {
            Value::Object(map) => Ok(map),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected a JSON object at top level, found {other}"),
            )),
        }
    }
}

impl SettingsSource for SettingsFile {
    fn read(&self) -> Map<String, Value> {
        match self.try_read() {
            Ok(map) => map,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file at {}; using defaults", self.path.display());
                Map::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read settings from {}: {e}; using defaults",
                    self.path.display()
                );
                Map::new()
            }
        }
    }
}

/// Settings held in memory. Clones share the same values, so an editor (or a
/// test) can keep a handle and mutate what the store will see on reload.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    values: Arc<RwLock<Map<String, Value>>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Set `key` (relative to the namespace).
    pub fn set(&self, key: &str, value: Value) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(format!("{CONFIGURATION_SECTION}.{key}"), value);
    }

    pub fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(&format!("{CONFIGURATION_SECTION}.{key}"));
    }
}

impl SettingsSource for InMemorySettings {
    fn read(&self) -> Map<String, Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ChangeListener = Box<dyn FnMut(Configuration)>;

/// Owns the current [`Configuration`] and fans out change notifications.
pub struct ConfigStore {
    source: Box<dyn SettingsSource>,
    platform: Platform,
    current: Configuration,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener: u64,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("platform", &self.platform)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    pub fn new(source: impl SettingsSource + 'static) -> Self {
        Self::with_platform(source, Platform::current())
    }

    pub fn with_platform(source: impl SettingsSource + 'static, platform: Platform) -> Self {
        let source: Box<dyn SettingsSource> = Box::new(source);
        let current = Configuration::from_values(&source.read(), platform);

        Self {
            source,
            platform,
            current,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Read the source afresh and merge with defaults. Does not replace
    /// [`ConfigStore::current`]; see [`ConfigStore::reload`].
    pub fn load(&self) -> Configuration {
        Configuration::from_values(&self.source.read(), self.platform)
    }

    pub fn current(&self) -> Configuration {
        self.current.clone()
    }

    /// Register a listener, invoked with every new snapshot in registration order.
    pub fn on_change(&mut self, listener: impl FnMut(Configuration) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Handle a host "configuration changed" signal for `section`.
    ///
    /// Returns whether the namespace was affected (and so reloaded).
    pub fn notify_changed(&mut self, section: &str) -> bool {
        if !affects_configuration(section) {
            debug!("Ignoring configuration change in unrelated section {section:?}");
            return false;
        }

        self.reload();
        true
    }

    /// Full reload followed by a broadcast to every listener.
    pub fn reload(&mut self) {
        self.current = self.load();
        debug!("Configuration reloaded: {:?}", self.current);

        for (id, listener) in &mut self.listeners {
            let snapshot = self.current.clone();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(snapshot)));
            if outcome.is_err() {
                error!("Configuration listener {id:?} panicked; continuing with the rest");
            }
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
