use std::{collections::BTreeMap, path::PathBuf};

use proptest::prelude::*;
use watchprefs::{
    GrayPolicy, MessageValue, NormalizedValue, PersistedPreferences, Platform, RawInput, RawValue,
    Rgb, Schema, SchemaVersion, Session, SessionConfig, ValidationError, dict::KeyTable, encode,
    migrate, store::{FileStore, MemoryStore}, transport::{DictTransport, RecordingTransport}, validate,
};

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn v1() -> Schema {
    Schema::from_path(SchemaVersion(1), fixture("blotch-v1.json")).unwrap()
}

fn v2() -> Schema {
    Schema::from_path(SchemaVersion(2), fixture("blotch-v2.json")).unwrap()
}

fn raw(entries: &[(&str, RawValue)]) -> RawInput {
    entries
        .iter()
        .map(|(k, v)| ((*k).into(), v.clone()))
        .collect()
}

fn text(s: &str) -> RawValue {
    RawValue::Text(s.into())
}

#[test]
fn v1_defaults_encode() {
    let message = encode(&v1(), &RawInput::new(), &Default::default(), GrayPolicy::Reject).unwrap();
    let values: Vec<_> = message
        .iter()
        .map(|(k, v)| (k.as_str(), v.to_message_value()))
        .collect();
    assert_eq!(
        values,
        [
            ("backgroundColor", MessageValue::Int(0xFF0000)),
            ("primaryColor", MessageValue::Int(0x0000FF)),
            ("secondaryColor", MessageValue::Int(0x00FF00)),
        ]
    );
}

#[test]
fn rename_between_versions() {
    let mut previous = PersistedPreferences::new();
    previous.insert("backgroundColor".into(), MessageValue::Int(0xFF0000));
    previous.insert("primaryColor".into(), MessageValue::Int(0x0000FF));

    let merged = migrate(&Default::default(), &previous, &v1_to_v2_schema(), GrayPolicy::Reject);

    let expected: PersistedPreferences = [
        ("backgroundColor".into(), MessageValue::Int(0xFF0000)),
        ("timeColor".into(), MessageValue::Int(0xFFFFFF)),
    ]
    .into_iter()
    .collect();
    assert_eq!(merged, expected);
}

/// v2 reduced to the two color keys involved in the rename.
fn v1_to_v2_schema() -> Schema {
    Schema::from_json_str(
        SchemaVersion(2),
        r#"[{"type": "section", "items": [
            {"type": "color", "messageKey": "backgroundColor", "defaultValue": "ff0000", "allowGray": true},
            {"type": "color", "messageKey": "timeColor", "defaultValue": "ffffff", "allowGray": true}
        ]}]"#,
    )
    .unwrap()
}

#[test]
fn highlight_gated_on_color() {
    let schema = v2();
    let bw = Platform::Diorite.capabilities();

    let message = encode(&schema, &RawInput::new(), &bw, GrayPolicy::Reject).unwrap();
    assert!(!message.contains_key("highlightColor"));

    let mut previous = PersistedPreferences::new();
    previous.insert("highlightColor".into(), MessageValue::Int(0x00AAFF));
    let merged = migrate(&message, &previous, &schema, GrayPolicy::Reject);
    assert_eq!(
        merged.get("highlightColor"),
        Some(&MessageValue::Int(0x00AAFF))
    );

    let color = Platform::Chalk.capabilities();
    let message = encode(&schema, &RawInput::new(), &color, GrayPolicy::Reject).unwrap();
    assert_eq!(
        message.get("highlightColor"),
        Some(&NormalizedValue::Color(Rgb::new(0xFFAA00).unwrap()))
    );
}

#[test]
fn highlight_rejects_gray_unless_clamped() {
    let schema = v2();
    let caps = Platform::Chalk.capabilities();
    let input = raw(&[("highlightColor", text("ababab"))]);

    let errors = encode(&schema, &input, &caps, GrayPolicy::Reject).unwrap_err();
    assert!(matches!(
        errors.get("highlightColor"),
        Some(ValidationError::GrayNotAllowed { .. })
    ));

    let message = encode(&schema, &input, &caps, GrayPolicy::Clamp).unwrap();
    assert_eq!(
        message["highlightColor"],
        NormalizedValue::Color(Rgb::new(0xAAAAFF).unwrap())
    );
}

#[test]
fn invalid_font_reported_with_other_errors() {
    let input = raw(&[
        ("timeFont", text("comic")),
        ("timeColor", text("#12345")),
        ("showWeekdays", RawValue::Int(3)),
    ]);
    let errors = encode(&v2(), &input, &Default::default(), GrayPolicy::Reject).unwrap_err();
    let keys: Vec<_> = errors.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, ["timeColor", "timeFont", "showWeekdays"]);
}

#[test]
fn encode_then_migrate_is_idempotent() {
    let schema = v2();
    let caps = Platform::Basalt.capabilities();
    let input = raw(&[
        ("backgroundColor", text("#000000")),
        ("timeColor", RawValue::Int(0xFFFF00)),
        ("secondaryColor", text("0x00aa55")),
        ("highlightColor", text("ff5500")),
        ("timeFont", text("bitham")),
        ("showWeekdays", RawValue::Bool(false)),
    ]);
    let message = encode(&schema, &input, &caps, GrayPolicy::Reject).unwrap();

    let mut previous = PersistedPreferences::new();
    previous.insert("primaryColor".into(), MessageValue::Int(0x0000FF));

    let once = migrate(&message, &previous, &schema, GrayPolicy::Reject);
    let twice = migrate(&message, &once, &schema, GrayPolicy::Reject);
    let settled = migrate(&Default::default(), &twice, &schema, GrayPolicy::Reject);
    assert_eq!(once, twice);
    assert_eq!(once, settled);
    assert_eq!(once.len(), 6);
}

#[test]
fn upgrade_session_against_file_store() {
    init_log();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blotch.json");

    let v1_config = SessionConfig {
        schema_version: SchemaVersion(1),
        platform: Some(Platform::Chalk),
        ..Default::default()
    };
    let store = FileStore::new(&path, SchemaVersion(1)).unwrap();
    let keys = KeyTable::from_schema(&v1(), &BTreeMap::new());
    let mut session = Session::new(v1(), v1_config, store, DictTransport::new(keys, Vec::new()));
    session
        .submit(&raw(&[("primaryColor", text("#00FF00"))]))
        .unwrap();

    let v2_config = SessionConfig {
        schema_version: SchemaVersion(2),
        platform: Some(Platform::Chalk),
        ..Default::default()
    };
    let store = FileStore::new(&path, SchemaVersion(2)).unwrap();
    let keys = KeyTable::from_schema(&v2(), &BTreeMap::new());
    let mut session = Session::new(v2(), v2_config, store, DictTransport::new(keys, Vec::new()));

    let opened = session.open().unwrap();
    assert!(!opened.contains_key("primaryColor"));
    assert_eq!(opened.get("timeColor"), Some(&MessageValue::Int(0xFFFFFF)));

    let submission = session
        .submit(&raw(&[("timeFont", text("roboto"))]))
        .unwrap();
    assert_eq!(
        submission.preferences.get("timeFont"),
        Some(&MessageValue::Text("roboto".into()))
    );

    let (store, transport) = session.into_parts();
    assert_eq!(store.stored_version().unwrap(), Some(SchemaVersion(2)));
    let bytes = transport.into_inner();
    assert_eq!(bytes[0] as usize, submission.message.len());
}

#[test]
fn open_resets_option_removed_from_schema() {
    let mut previous = PersistedPreferences::new();
    previous.insert("timeFont".into(), MessageValue::Text("comic".into()));
    previous.insert("showWeekdays".into(), MessageValue::Bool(false));

    let config = SessionConfig {
        schema_version: SchemaVersion(2),
        platform: Some(Platform::Basalt),
        ..Default::default()
    };
    let session = Session::new(
        v2(),
        config,
        MemoryStore::with_preferences(previous),
        RecordingTransport::new(),
    );

    let opened = session.open().unwrap();
    assert_eq!(opened.get("timeFont"), Some(&MessageValue::Text("leco".into())));
    assert_eq!(opened.get("showWeekdays"), Some(&MessageValue::Bool(false)));
}

fn hex_color() -> impl Strategy<Value = String> {
    "[0-9a-fA-F]{6}"
}

proptest! {
    #[test]
    fn color_prefix_and_case_do_not_matter(digits in hex_color(), prefix in prop::sample::select(vec!["", "#", "0x", "0X"])) {
        let item = v2();
        let item = item.find("timeColor").unwrap();

        let canonical = validate(item, Some(&text(&digits.to_lowercase())), GrayPolicy::Reject).unwrap();
        for variant in [digits.to_uppercase(), digits.to_lowercase(), digits.clone()] {
            let raw = text(&format!("{prefix}{variant}"));
            prop_assert_eq!(validate(item, Some(&raw), GrayPolicy::Reject).unwrap(), canonical.clone());
        }
    }
}
