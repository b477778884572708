use super::*;
use serde_json::json;
use std::{cell::RefCell, rc::Rc};
use tempfile::tempdir;

const PLATFORMS: [Platform; 4] = [
    Platform::Windows,
    Platform::MacOs,
    Platform::Linux,
    Platform::Other,
];

#[test]
fn platform_from_os_recognizes_three_platforms() {
    let cases: &[(&str, Platform)] = &[
        ("windows", Platform::Windows),
        ("macos", Platform::MacOs),
        ("linux", Platform::Linux),
        ("freebsd", Platform::Other),
        ("", Platform::Other),
    ];

    for (os, expected) in cases {
        assert_eq!(Platform::from_os(os), *expected, "os {:?}", os);
    }
}

#[test]
fn absent_keys_take_documented_defaults_on_every_platform() {
    for platform in PLATFORMS {
        let store = ConfigStore::with_platform(InMemorySettings::new(), platform);
        let cfg = store.current();

        assert_eq!(cfg.status_bar_alignment, Alignment::Right, "{platform:?}");
        assert_eq!(
            cfg.show_permissions_in_status_bar,
            platform != Platform::Windows,
            "permissions default on {platform:?}"
        );
        assert!(cfg.show_size_in_status_bar, "{platform:?}");
        assert!(!cfg.show_atime_in_status_bar, "{platform:?}");
        assert!(cfg.show_mtime_in_status_bar, "{platform:?}");
        assert!(!cfg.show_ctime_in_status_bar, "{platform:?}");
        assert_eq!(cfg.size_unit, SizeUnit::Iec, "{platform:?}");
        assert_eq!(cfg.time_format, DEFAULT_TIME_FORMAT, "{platform:?}");
        assert_eq!(cfg, Configuration::defaults_for(platform));
    }
}

#[test]
fn user_values_override_defaults() {
    let settings = InMemorySettings::new();
    settings.set(keys::STATUS_BAR_ALIGNMENT, json!("Left"));
    settings.set(keys::SHOW_PERMISSIONS, json!(true));
    settings.set(keys::SHOW_SIZE, json!(false));
    settings.set(keys::SHOW_ATIME, json!(true));
    settings.set(keys::SHOW_MTIME, json!(false));
    settings.set(keys::SHOW_CTIME, json!(true));
    settings.set(keys::SIZE_UNIT, json!("si"));
    settings.set(keys::TIME_FORMAT, json!("DD/MM/YYYY"));

    let cfg = ConfigStore::with_platform(settings, Platform::Windows).current();

    assert_eq!(
        cfg,
        Configuration {
            status_bar_alignment: Alignment::Left,
            show_permissions_in_status_bar: true,
            show_size_in_status_bar: false,
            show_atime_in_status_bar: true,
            show_mtime_in_status_bar: false,
            show_ctime_in_status_bar: true,
            size_unit: SizeUnit::Si,
            time_format: "DD/MM/YYYY".to_owned(),
        }
    );
}

#[test]
fn nested_section_is_read_and_flat_keys_win() {
    let values = json!({
        "file-properties": {
            "sizeUnit": "si",
            "statusBarAlignment": "Left",
        },
        "file-properties.statusBarAlignment": "Right",
    });
    let Value::Object(map) = values else {
        unreachable!()
    };

    let cfg = Configuration::from_values(&map, Platform::Linux);
    assert_eq!(cfg.size_unit, SizeUnit::Si);
    assert_eq!(cfg.status_bar_alignment, Alignment::Right);
}

#[test]
fn wrongly_typed_or_unknown_values_fall_back_to_defaults() {
    let settings = InMemorySettings::new();
    settings.set(keys::SHOW_SIZE, json!("yes"));
    settings.set(keys::SIZE_UNIT, json!("metric"));
    settings.set(keys::STATUS_BAR_ALIGNMENT, json!(3));
    settings.set(keys::TIME_FORMAT, json!(null));

    let cfg = ConfigStore::with_platform(settings, Platform::Linux).current();
    assert_eq!(cfg, Configuration::defaults_for(Platform::Linux));
}

#[test]
fn enum_values_parse_case_insensitively() {
    assert_eq!(Alignment::parse("left"), Some(Alignment::Left));
    assert_eq!(Alignment::parse("RIGHT"), Some(Alignment::Right));
    assert_eq!(Alignment::parse("center"), None);
    assert_eq!(SizeUnit::parse("SI"), Some(SizeUnit::Si));
    assert_eq!(SizeUnit::parse("iec"), Some(SizeUnit::Iec));
    assert_eq!(SizeUnit::parse("jedec"), None);
}

#[test]
fn affects_configuration_matches_namespace_keys_and_root() {
    let cases: &[(&str, bool)] = &[
        ("file-properties", true),
        ("file-properties.sizeUnit", true),
        ("file-propertiesX", false),
        ("file-properties-extra.sizeUnit", false),
        ("editor.fontSize", false),
        ("", true),
        (".", false),
    ];

    for (section, expected) in cases {
        assert_eq!(
            affects_configuration(section),
            *expected,
            "section {:?}",
            section
        );
    }
}

#[test]
fn change_notification_reloads_and_broadcasts_in_order() {
    let settings = InMemorySettings::new();
    let mut store = ConfigStore::with_platform(settings.clone(), Platform::Linux);

    let seen: Rc<RefCell<Vec<(&str, SizeUnit)>>> = Rc::default();
    for name in ["first", "second", "third"] {
        let seen = Rc::clone(&seen);
        store.on_change(move |cfg| seen.borrow_mut().push((name, cfg.size_unit)));
    }

    settings.set(keys::SIZE_UNIT, json!("si"));
    assert_eq!(store.current().size_unit, SizeUnit::Iec, "not reloaded yet");

    assert!(store.notify_changed("file-properties"));
    assert_eq!(store.current().size_unit, SizeUnit::Si);
    assert_eq!(
        *seen.borrow(),
        vec![
            ("first", SizeUnit::Si),
            ("second", SizeUnit::Si),
            ("third", SizeUnit::Si)
        ]
    );
}

#[test]
fn empty_section_reloads_everything() {
    let settings = InMemorySettings::new();
    let mut store = ConfigStore::with_platform(settings.clone(), Platform::Linux);

    settings.set(keys::STATUS_BAR_ALIGNMENT, json!("Left"));
    assert!(store.notify_changed(""));
    assert_eq!(store.current().status_bar_alignment, Alignment::Left);
}

#[test]
fn unrelated_section_does_not_reload() {
    let settings = InMemorySettings::new();
    let mut store = ConfigStore::with_platform(settings.clone(), Platform::Linux);
    let calls = Rc::new(RefCell::new(0));
    {
        let calls = Rc::clone(&calls);
        store.on_change(move |_| *calls.borrow_mut() += 1);
    }

    settings.set(keys::SHOW_SIZE, json!(false));
    assert!(!store.notify_changed("editor"));
    assert!(store.current().show_size_in_status_bar);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn panicking_listener_does_not_starve_the_others() {
    let mut store = ConfigStore::with_platform(InMemorySettings::new(), Platform::Linux);
    let calls = Rc::new(RefCell::new(Vec::new()));

    {
        let calls = Rc::clone(&calls);
        store.on_change(move |_| calls.borrow_mut().push("before"));
    }
    store.on_change(|_| panic!("listener failure"));
    {
        let calls = Rc::clone(&calls);
        store.on_change(move |_| calls.borrow_mut().push("after"));
    }

    store.reload();
    store.reload();
    assert_eq!(*calls.borrow(), vec!["before", "after", "before", "after"]);
}

#[test]
fn removed_listener_is_not_invoked() {
    let mut store = ConfigStore::with_platform(InMemorySettings::new(), Platform::Linux);
    let calls = Rc::new(RefCell::new(0));

    let id = {
        let calls = Rc::clone(&calls);
        store.on_change(move |_| *calls.borrow_mut() += 1)
    };

    assert!(store.remove_listener(id));
    assert!(!store.remove_listener(id));
    store.reload();
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn listeners_receive_independent_snapshots() {
    let mut store = ConfigStore::with_platform(InMemorySettings::new(), Platform::Linux);
    store.on_change(|mut cfg| cfg.time_format.push_str(" mutated"));

    store.reload();
    assert_eq!(store.current().time_format, DEFAULT_TIME_FORMAT);
}

#[test]
fn settings_file_is_reread_on_every_load() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "file-properties.sizeUnit": "si" }"#).expect("write settings");

    let mut store = ConfigStore::with_platform(SettingsFile::new(&path), Platform::Linux);
    assert_eq!(store.current().size_unit, SizeUnit::Si);

    fs::write(
        &path,
        r#"{ "file-properties": { "sizeUnit": "iec", "showCTimeInStatusBar": true } }"#,
    )
    .expect("rewrite settings");
    store.reload();

    let cfg = store.current();
    assert_eq!(cfg.size_unit, SizeUnit::Iec);
    assert!(cfg.show_ctime_in_status_bar);
}

#[test]
fn missing_or_malformed_settings_file_yields_defaults() {
    let dir = tempdir().expect("create temp dir");

    let missing = SettingsFile::new(dir.path().join("absent.json"));
    assert!(missing.read().is_empty());

    let malformed_path = dir.path().join("malformed.json");
    fs::write(&malformed_path, "{ not json").expect("write malformed");
    assert!(SettingsFile::new(&malformed_path).read().is_empty());

    let array_path = dir.path().join("array.json");
    fs::write(&array_path, "[1, 2, 3]").expect("write array");
    let store = ConfigStore::with_platform(SettingsFile::new(&array_path), Platform::MacOs);
    assert_eq!(store.current(), Configuration::defaults_for(Platform::MacOs));
}

#[test]
fn configuration_serializes_with_setting_key_names() {
    let cfg = Configuration::defaults_for(Platform::Linux);
    let value = serde_json::to_value(&cfg).expect("serialize configuration");
    let obj = value.as_object().expect("object");

    for key in keys::ALL {
        assert!(obj.contains_key(*key), "missing key {key} in {value}");
    }
    assert_eq!(obj[keys::SIZE_UNIT], json!("iec"));
    assert_eq!(obj[keys::STATUS_BAR_ALIGNMENT], json!("Right"));
}
