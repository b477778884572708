use super::*;
use fprop_fs::TypeFlags;
use fprop_runtime::{Platform, SizeUnit};
use std::{
    path::PathBuf,
    time::{Duration, UNIX_EPOCH},
};

fn snapshot() -> StatSnapshot {
    StatSnapshot {
        path: PathBuf::from("/srv/app.log"),
        dev: Some(1),
        ino: Some(2),
        mode: 0o100640,
        nlink: Some(1),
        uid: Some(0),
        gid: Some(0),
        rdev: Some(0),
        size: 1_500_000,
        blksize: Some(4096),
        blocks: Some(2936),
        atime: Some(UNIX_EPOCH + Duration::from_secs(1_000)),
        mtime: Some(UNIX_EPOCH + Duration::from_secs(2_000)),
        ctime: None,
        birthtime: None,
        flags: TypeFlags::REGULAR,
    }
}

fn stamp(secs: u64) -> String {
    format_timestamp(UNIX_EPOCH + Duration::from_secs(secs), "YYYY-MM-DD")
}

#[test]
fn fields_follow_enabled_flags_in_fixed_order() {
    type Toggle = fn(&mut Configuration);

    let cases: &[(&str, Toggle, Option<String>)] = &[
        (
            "linux defaults",
            |_| {},
            Some(format!("[ rw-r----- | 1.43 MiB | {} ]", stamp(2_000))),
        ),
        (
            "si sizes",
            |c| c.size_unit = SizeUnit::Si,
            Some(format!("[ rw-r----- | 1.50 MB | {} ]", stamp(2_000))),
        ),
        (
            "all times",
            |c| {
                c.show_permissions_in_status_bar = false;
                c.show_size_in_status_bar = false;
                c.show_atime_in_status_bar = true;
                c.show_ctime_in_status_bar = true;
            },
            Some(format!("[ {} | {} | - ]", stamp(1_000), stamp(2_000))),
        ),
        (
            "size only",
            |c| {
                c.show_permissions_in_status_bar = false;
                c.show_mtime_in_status_bar = false;
            },
            Some("[ 1.43 MiB ]".to_owned()),
        ),
        (
            "nothing enabled",
            |c| {
                c.show_permissions_in_status_bar = false;
                c.show_size_in_status_bar = false;
                c.show_mtime_in_status_bar = false;
            },
            None,
        ),
    ];

    for (name, toggle, expected) in cases {
        let mut cfg = Configuration::defaults_for(Platform::Linux);
        cfg.time_format = "YYYY-MM-DD".to_owned();
        toggle(&mut cfg);

        assert_eq!(summary_text(&snapshot(), &cfg), *expected, "{name}");
    }
}

#[test]
fn windows_defaults_omit_permissions() {
    let mut cfg = Configuration::defaults_for(Platform::Windows);
    cfg.show_mtime_in_status_bar = false;

    assert_eq!(
        summary_text(&snapshot(), &cfg).as_deref(),
        Some("[ 1.43 MiB ]")
    );
}
