mod format;
mod snapshot;

pub use format::{
    format_datetime, format_permissions, format_size, format_timestamp, strftime_pattern,
};
pub use snapshot::{BLOCK_UNIT, FileType, StatSnapshot, TypeFlags, lstat, stat};
