//! Reconciliation of a submission with persisted preferences.
//!
//! Preferences saved by an older schema version may use keys that were
//! renamed or removed since. Migration keeps what still exists, lets the
//! new submission win, fills in defaults for new keys and drops the rest.

use crate::{
    config::GrayPolicy,
    data::{EncodedMessage, PersistedPreferences, RawValue, Schema},
    validate::validate,
};

/// Merge `current` into `previous` against the key set of `schema`.
///
/// - keys no item of `schema` declares are dropped;
/// - stored values the current item rejects are treated as missing;
/// - submitted values overwrite persisted ones;
/// - schema keys still missing get the item's default, when it has a
///   usable one.
///
/// Keys of capability-gated items belong to the schema even when inactive,
/// so their persisted values survive untouched. Migrating the result again
/// with an empty submission returns it unchanged.
pub fn migrate(
    current: &EncodedMessage,
    previous: &PersistedPreferences,
    schema: &Schema,
    policy: GrayPolicy,
) -> PersistedPreferences {
    let keys = schema.message_keys();

    let mut merged = PersistedPreferences::new();
    for (key, value) in previous {
        let Some(item) = schema.find(key.as_str()) else {
            info!("dropping stale preference `{key}` (not in schema {})", schema.version());
            continue;
        };
        match validate(item, Some(&RawValue::from(value)), policy) {
            Ok(_) => {
                merged.insert(key.clone(), value.clone());
            }
            Err(e) => info!("stored `{key}` no longer valid ({e}), resetting"),
        }
    }

    for (key, value) in current {
        if keys.contains(key) {
            merged.insert(key.clone(), value.to_message_value());
        } else {
            warn!("submitted value for unknown key `{key}` ignored");
        }
    }

    for (_, item, key) in schema.input_items() {
        if merged.contains_key(key) {
            continue;
        }
        match validate(item, None, policy) {
            Ok(default) => {
                debug!("`{key}` introduced by schema {}, using default", schema.version());
                merged.insert(key.clone(), default.to_message_value());
            }
            Err(e) => debug!("`{key}` has no usable default: {e}"),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::Rgb,
        data::{MessageValue, NormalizedValue, SchemaVersion},
    };

    fn v2() -> Schema {
        Schema::from_json_str(
            SchemaVersion(2),
            r#"[
                {"type": "color", "messageKey": "backgroundColor", "defaultValue": "ff0000", "allowGray": true},
                {"type": "color", "messageKey": "timeColor", "defaultValue": "ffffff", "allowGray": true},
                {"type": "color", "messageKey": "highlightColor", "defaultValue": "00ff00", "capabilities": ["COLOR"]},
                {"type": "color", "messageKey": "accentColor"}
            ]"#,
        )
        .unwrap()
    }

    fn prefs(entries: &[(&str, i64)]) -> PersistedPreferences {
        entries
            .iter()
            .map(|(k, v)| ((*k).into(), MessageValue::Int(*v)))
            .collect()
    }

    #[test]
    fn test_rename_drops_old_key_and_defaults_new_one() {
        let previous = prefs(&[("backgroundColor", 0xFF0000), ("primaryColor", 0x0000FF)]);
        let merged = migrate(&EncodedMessage::new(), &previous, &v2(), GrayPolicy::Reject);

        assert_eq!(merged.get("backgroundColor"), Some(&MessageValue::Int(0xFF0000)));
        assert_eq!(merged.get("timeColor"), Some(&MessageValue::Int(0xFFFFFF)));
        assert!(!merged.contains_key("primaryColor"));
    }

    #[test]
    fn test_submission_wins() {
        let previous = prefs(&[("backgroundColor", 0xFF0000), ("timeColor", 0x0000FF)]);
        let mut current = EncodedMessage::new();
        current.insert(
            "timeColor".into(),
            NormalizedValue::Color(Rgb::new(0x00AA00).unwrap()),
        );

        let merged = migrate(&current, &previous, &v2(), GrayPolicy::Reject);
        assert_eq!(merged.get("timeColor"), Some(&MessageValue::Int(0x00AA00)));
        assert_eq!(merged.get("backgroundColor"), Some(&MessageValue::Int(0xFF0000)));
    }

    #[test]
    fn test_inactive_value_preserved() {
        let previous = prefs(&[("highlightColor", 0x123456)]);
        let merged = migrate(&EncodedMessage::new(), &previous, &v2(), GrayPolicy::Reject);
        assert_eq!(merged.get("highlightColor"), Some(&MessageValue::Int(0x123456)));
    }

    #[test]
    fn test_item_without_default_left_out() {
        let merged = migrate(
            &EncodedMessage::new(),
            &PersistedPreferences::new(),
            &v2(),
            GrayPolicy::Reject,
        );
        assert!(!merged.contains_key("accentColor"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_unknown_submitted_key_ignored() {
        let mut current = EncodedMessage::new();
        current.insert("ghost".into(), NormalizedValue::Toggle(true));
        let merged = migrate(&current, &PersistedPreferences::new(), &v2(), GrayPolicy::Reject);
        assert!(!merged.contains_key("ghost"));
    }

    #[test]
    fn test_stale_option_falls_back_to_default() {
        let schema = Schema::from_json_str(
            SchemaVersion(2),
            r#"[
                {"type": "select", "messageKey": "timeFont", "defaultValue": "leco",
                 "options": [{"label": "LECO", "value": "leco"}, {"label": "Bitham", "value": "bitham"}]},
                {"type": "select", "messageKey": "dateFont",
                 "options": [{"label": "Gothic", "value": "gothic"}]}
            ]"#,
        )
        .unwrap();
        let mut previous = PersistedPreferences::new();
        previous.insert("timeFont".into(), MessageValue::Text("roboto".into()));
        previous.insert("dateFont".into(), MessageValue::Text("roboto".into()));

        let merged = migrate(&EncodedMessage::new(), &previous, &schema, GrayPolicy::Reject);
        assert_eq!(merged.get("timeFont"), Some(&MessageValue::Text("leco".into())));
        assert!(!merged.contains_key("dateFont"));

        let again = migrate(&EncodedMessage::new(), &merged, &schema, GrayPolicy::Reject);
        assert_eq!(again, merged);
    }

    #[test]
    fn test_valid_value_kept_as_stored() {
        let schema = Schema::from_json_str(
            SchemaVersion(2),
            r#"[{"type": "select", "messageKey": "size", "defaultValue": 1,
                 "options": [{"label": "Small", "value": 1}, {"label": "Large", "value": 2}]}]"#,
        )
        .unwrap();
        let mut previous = PersistedPreferences::new();
        previous.insert("size".into(), MessageValue::Text("2".into()));

        let merged = migrate(&EncodedMessage::new(), &previous, &schema, GrayPolicy::Reject);
        assert_eq!(merged.get("size"), Some(&MessageValue::Text("2".into())));
    }

    #[test]
    fn test_idempotent() {
        let previous = prefs(&[("primaryColor", 0x0000FF), ("timeColor", 0x111111)]);
        let once = migrate(&EncodedMessage::new(), &previous, &v2(), GrayPolicy::Reject);
        let twice = migrate(&EncodedMessage::new(), &once, &v2(), GrayPolicy::Reject);
        assert_eq!(once, twice);
    }
}
