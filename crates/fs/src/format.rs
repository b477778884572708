use std::fmt::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{
    DateTime, Local, TimeDelta, TimeZone,
    format::{Item, StrftimeItems},
};
use fprop_runtime::{SizeUnit, settings::DEFAULT_TIME_FORMAT};
use log::warn;

/// Owner, group, other; read, write, execute.
const PERMISSION_BITS: [(u32, char); 9] = [
    (0o400, 'r'),
    (0o200, 'w'),
    (0o100, 'x'),
    (0o040, 'r'),
    (0o020, 'w'),
    (0o010, 'x'),
    (0o004, 'r'),
    (0o002, 'w'),
    (0o001, 'x'),
];

const SI_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const IEC_UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Render the nine permission bits of `mode` as `rwxr-xr-x`.
pub fn format_permissions(mode: u32) -> String {
    PERMISSION_BITS
        .iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

/// Scale `bytes` to the largest unit that keeps the value at or above 1,
/// capped at `YB`/`YiB`.
pub fn format_size(bytes: u128, unit: SizeUnit) -> String {
    let (units, step) = match unit {
        SizeUnit::Si => (&SI_UNITS, 1000.0),
        SizeUnit::Iec => (&IEC_UNITS, 1024.0),
    };

    let mut size = bytes as f64;
    let mut index = 0;
    while size >= step && index < units.len() - 1 {
        size /= step;
        index += 1;
    }

    format!("{size:.2} {}", units[index])
}

/// Format `t` in the local timezone. See [`format_datetime`] for `pattern`.
///
/// Instants chrono cannot represent are rendered as raw Unix seconds.
pub fn format_timestamp(t: SystemTime, pattern: &str) -> String {
    match local_datetime(t) {
        Some(dt) => format_datetime(&dt, pattern),
        None => {
            let raw = unix_seconds(t);
            warn!("Timestamp {raw}s is outside the representable range");
            raw
        }
    }
}

/// Split `t` into whole seconds and nanoseconds around the Unix epoch.
fn epoch_parts(t: SystemTime) -> Option<(i64, u32)> {
    match t.duration_since(UNIX_EPOCH) {
        Ok(after) => Some((i64::try_from(after.as_secs()).ok()?, after.subsec_nanos())),
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => Some((-secs, 0)),
                nanos => Some((-secs - 1, 1_000_000_000 - nanos)),
            }
        }
    }
}

fn local_datetime(t: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = epoch_parts(t)?;
    let utc = DateTime::from_timestamp(secs, nanos)?;

    // Keep a day of headroom so any local offset stays in range.
    let day = TimeDelta::days(1);
    utc.checked_add_signed(day)?;
    utc.checked_sub_signed(day)?;

    Some(utc.with_timezone(&Local))
}

fn unix_seconds(t: SystemTime) -> String {
    match t.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs().to_string(),
        Err(e) => format!("-{}", e.duration().as_secs()),
    }
}

/// Format `dt` with a Day.js-style `pattern` (`YYYY-MM-DD HH:mm:ss`).
///
/// Patterns containing `%` are taken as chrono strftime patterns verbatim.
/// A pattern chrono cannot render falls back to the default format.
pub fn format_datetime<Tz>(dt: &DateTime<Tz>, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let strftime = if pattern.contains('%') {
        pattern.to_owned()
    } else {
        strftime_pattern(pattern)
    };

    if let Some(out) = render(dt, &strftime) {
        return out;
    }

    warn!("Invalid time format {pattern:?}; falling back to {DEFAULT_TIME_FORMAT:?}");
    render(dt, &strftime_pattern(DEFAULT_TIME_FORMAT)).unwrap_or_default()
}

fn render<Tz>(dt: &DateTime<Tz>, strftime: &str) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(strftime).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut out = String::new();
    write!(out, "{}", dt.format_with_items(items.iter())).ok()?;
    Some(out)
}

/// Day.js tokens and their strftime equivalents. Longer tokens first.
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("d", "%w"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("SSS", "%3f"),
    ("A", "%p"),
    ("a", "%P"),
    ("ZZ", "%z"),
    ("Z", "%:z"),
    ("X", "%s"),
];

/// Translate a Day.js-style pattern into a chrono strftime pattern.
///
/// Text inside `[...]` is copied literally, as is anything that is not a token.
pub fn strftime_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '['
            && let Some(end) = rest.find(']')
        {
            push_literal(&mut out, &rest[1..end]);
            rest = &rest[end + 1..];
            continue;
        }

        if let Some((token, strftime)) = TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            out.push_str(strftime);
            rest = &rest[token.len()..];
            continue;
        }

        push_literal(&mut out, &rest[..c.len_utf8()]);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn push_literal(out: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
