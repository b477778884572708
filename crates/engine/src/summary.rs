use fprop_fs::{StatSnapshot, format_permissions, format_size, format_timestamp};
use fprop_runtime::Configuration;

use crate::report::PLACEHOLDER;

pub const STATUS_BAR_TOOLTIP: &str = "Click to view detailed file properties";

/// Status-bar text, `[ rw-r--r-- | 2.00 KiB | 2024-03-05 14:08:09 ]`.
///
/// Fields appear in a fixed order (permissions, size, atime, mtime, ctime)
/// and only when enabled. `None` when nothing is enabled.
pub fn summary_text(snap: &StatSnapshot, cfg: &Configuration) -> Option<String> {
    let mut parts = Vec::with_capacity(5);

    if cfg.show_permissions_in_status_bar {
        parts.push(format_permissions(snap.mode));
    }
    if cfg.show_size_in_status_bar {
        parts.push(format_size(u128::from(snap.size), cfg.size_unit));
    }

    let times = [
        (cfg.show_atime_in_status_bar, snap.atime),
        (cfg.show_mtime_in_status_bar, snap.mtime),
        (cfg.show_ctime_in_status_bar, snap.ctime),
    ];
    for (enabled, time) in times {
        if enabled {
            parts.push(time.map_or_else(
                || PLACEHOLDER.to_owned(),
                |t| format_timestamp(t, &cfg.time_format),
            ));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("[ {} ]", parts.join(" | ")))
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
