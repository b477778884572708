use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use bitflags::bitflags;

bitflags! {
    /// Type predicates as reported by the platform for one stat call.
    ///
    /// Kept as raw predicates rather than a single kind so that
    /// [`StatSnapshot::file_type`] decides overlaps in one fixed order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        const BLOCK_DEVICE = 0b0000_0001;
        const CHAR_DEVICE  = 0b0000_0010;
        const FIFO         = 0b0000_0100;
        const REGULAR      = 0b0000_1000;
        const DIRECTORY    = 0b0001_0000;
        const SYMLINK      = 0b0010_0000;
        const SOCKET       = 0b0100_0000;
    }
}

/// Classification order for [`TypeFlags`]; the first set flag wins.
const TYPE_PRIORITY: [(TypeFlags, FileType); 7] = [
    (TypeFlags::BLOCK_DEVICE, FileType::BlockDevice),
    (TypeFlags::CHAR_DEVICE, FileType::CharacterDevice),
    (TypeFlags::FIFO, FileType::Fifo),
    (TypeFlags::REGULAR, FileType::Regular),
    (TypeFlags::DIRECTORY, FileType::Directory),
    (TypeFlags::SYMLINK, FileType::Symlink),
    (TypeFlags::SOCKET, FileType::Socket),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    BlockDevice,
    CharacterDevice,
    Fifo,
    Regular,
    Directory,
    Symlink,
    Socket,
    Unknown,
}

impl FileType {
    pub fn classify(flags: TypeFlags) -> Self {
        TYPE_PRIORITY
            .iter()
            .find(|(flag, _)| flags.contains(*flag))
            .map(|(_, kind)| *kind)
            .unwrap_or(FileType::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            FileType::BlockDevice => "Block Device",
            FileType::CharacterDevice => "Character Device",
            FileType::Fifo => "FIFO",
            FileType::Regular => "Regular File",
            FileType::Directory => "Directory",
            FileType::Symlink => "Symbolic Link",
            FileType::Socket => "Socket",
            FileType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One point-in-time stat of a path. Never cached; take a new one instead.
///
/// Fields the platform cannot provide are `None` (ownership, inode and
/// block counts on Windows; birth time on filesystems without it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSnapshot {
    pub path: PathBuf,
    /// Device the file resides on.
    pub dev: Option<u64>,
    pub ino: Option<u64>,
    /// File type and permission bits. Synthesized from the read-only flag
    /// where the platform has no mode.
    pub mode: u32,
    /// Number of hard links.
    pub nlink: Option<u64>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    /// Device this inode represents, for special files.
    pub rdev: Option<u64>,
    pub size: u64,
    /// Preferred I/O block size.
    pub blksize: Option<u64>,
    /// Allocated 512-byte blocks.
    pub blocks: Option<u64>,
    pub atime: Option<SystemTime>,
    pub mtime: Option<SystemTime>,
    /// Inode status change time.
    pub ctime: Option<SystemTime>,
    pub birthtime: Option<SystemTime>,
    pub flags: TypeFlags,
}

/// Size of the unit `blocks` is counted in.
pub const BLOCK_UNIT: u64 = 512;

impl StatSnapshot {
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &fs::Metadata) -> Self {
        let platform = PlatformFields::from_metadata(metadata);

        Self {
            path: path.into(),
            dev: platform.dev,
            ino: platform.ino,
            mode: platform.mode,
            nlink: platform.nlink,
            uid: platform.uid,
            gid: platform.gid,
            rdev: platform.rdev,
            size: metadata.len(),
            blksize: platform.blksize,
            blocks: platform.blocks,
            atime: metadata.accessed().ok(),
            mtime: metadata.modified().ok(),
            ctime: platform.ctime,
            birthtime: metadata.created().ok(),
            flags: type_flags(metadata.file_type()),
        }
    }

    pub fn file_type(&self) -> FileType {
        FileType::classify(self.flags)
    }

    /// Bytes actually allocated on disk, when the platform reports blocks.
    pub fn allocated_bytes(&self) -> Option<u64> {
        self.blocks.map(|b| b.saturating_mul(BLOCK_UNIT))
    }
}

/// Stat `path`, following symlinks.
pub fn stat(path: &Path) -> io::Result<StatSnapshot> {
    let metadata = fs::metadata(path)?;
    Ok(StatSnapshot::from_metadata(path, &metadata))
}

/// Stat `path` itself, without following a final symlink.
pub fn lstat(path: &Path) -> io::Result<StatSnapshot> {
    let metadata = fs::symlink_metadata(path)?;
    Ok(StatSnapshot::from_metadata(path, &metadata))
}

fn type_flags(ft: fs::FileType) -> TypeFlags {
    let mut flags = TypeFlags::empty();
    flags.set(TypeFlags::REGULAR, ft.is_file());
    flags.set(TypeFlags::DIRECTORY, ft.is_dir());
    flags.set(TypeFlags::SYMLINK, ft.is_symlink());

    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;

        flags.set(TypeFlags::BLOCK_DEVICE, ft.is_block_device());
        flags.set(TypeFlags::CHAR_DEVICE, ft.is_char_device());
        flags.set(TypeFlags::FIFO, ft.is_fifo());
        flags.set(TypeFlags::SOCKET, ft.is_socket());
    }

    flags
}

/// The part of a stat record that only some platforms expose.
struct PlatformFields {
    dev: Option<u64>,
    ino: Option<u64>,
    mode: u32,
    nlink: Option<u64>,
    uid: Option<u32>,
    gid: Option<u32>,
    rdev: Option<u64>,
    blksize: Option<u64>,
    blocks: Option<u64>,
    ctime: Option<SystemTime>,
}

impl PlatformFields {
    #[cfg(unix)]
    fn from_metadata(metadata: &fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            dev: Some(metadata.dev()),
            ino: Some(metadata.ino()),
            mode: metadata.mode(),
            nlink: Some(metadata.nlink()),
            uid: Some(metadata.uid()),
            gid: Some(metadata.gid()),
            rdev: Some(metadata.rdev()),
            blksize: Some(metadata.blksize()),
            blocks: Some(metadata.blocks()),
            ctime: unix_time(metadata.ctime(), metadata.ctime_nsec()),
        }
    }

    #[cfg(not(unix))]
    fn from_metadata(metadata: &fs::Metadata) -> Self {
        // Same shape as what Node reports on Windows: type bits plus
        // rw or r-only for everyone depending on the read-only attribute.
        const S_IFREG: u32 = 0o100000;
        const S_IFDIR: u32 = 0o040000;
        const S_IFLNK: u32 = 0o120000;

        let ft = metadata.file_type();
        let kind = if ft.is_symlink() {
            S_IFLNK
        } else if ft.is_dir() {
            S_IFDIR
        } else {
            S_IFREG
        };
        let perms = if metadata.permissions().readonly() {
            0o444
        } else {
            0o666
        };
        let exec = if ft.is_dir() { 0o111 } else { 0 };

        Self {
            dev: None,
            ino: None,
            mode: kind | perms | exec,
            nlink: None,
            uid: None,
            gid: None,
            rdev: None,
            blksize: None,
            blocks: None,
            ctime: None,
        }
    }
}

#[cfg(unix)]
fn unix_time(secs: i64, nsec: i64) -> Option<SystemTime> {
    use std::time::{Duration, UNIX_EPOCH};

    let nanos = u32::try_from(nsec).ok()?;
    if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::new(secs.unsigned_abs(), nanos))
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(secs.unsigned_abs()))?
            .checked_add(Duration::from_nanos(u64::from(nanos)))
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
