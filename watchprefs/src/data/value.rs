use std::{borrow::Borrow, collections::BTreeMap, fmt};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Stable identifier of one settings value in the device message.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct MessageKey(String);

impl MessageKey {
    /// Wrap a key name.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MessageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One value as the settings page submitted it.
///
/// Anything that is not a boolean, an integer or a string is rejected when
/// the input is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawValue {
    /// Checkbox or toggle state.
    Bool(bool),
    /// Numeric control value, or a color sent as an integer.
    Int(i64),
    /// Text value: hex colors, option values.
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// Values submitted for one settings page, keyed by message key.
pub type RawInput = BTreeMap<MessageKey, RawValue>;

/// Value of a `select` or `radiogroup` option.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(untagged)]
pub enum OptionValue {
    /// Numeric option.
    Int(i64),
    /// Text option.
    Text(String),
}

impl OptionValue {
    /// Whether a submitted value selects this option.
    ///
    /// Forms submit numbers as strings, so `"3"` selects `3` and `3`
    /// selects `"3"`.
    pub fn matches(&self, raw: &RawValue) -> bool {
        match (self, raw) {
            (OptionValue::Int(i), RawValue::Int(j)) => i == j,
            (OptionValue::Text(s), RawValue::Text(t)) => s == t,
            (OptionValue::Int(i), RawValue::Text(t)) => t.trim().parse::<i64>() == Ok(*i),
            (OptionValue::Text(s), RawValue::Int(j)) => *s == j.to_string(),
            (_, RawValue::Bool(_)) => false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

/// A validated value, typed by the kind of item that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    /// `color` item.
    Color(Rgb),
    /// `select` or `radiogroup` item.
    Choice(OptionValue),
    /// `toggle` item.
    Toggle(bool),
}

impl NormalizedValue {
    /// Untyped scalar used for persistence and delivery.
    pub fn to_message_value(&self) -> MessageValue {
        match self {
            NormalizedValue::Color(c) => MessageValue::Int(i64::from(c.value())),
            NormalizedValue::Choice(OptionValue::Int(i)) => MessageValue::Int(*i),
            NormalizedValue::Choice(OptionValue::Text(s)) => MessageValue::Text(s.clone()),
            NormalizedValue::Toggle(b) => MessageValue::Bool(*b),
        }
    }
}

/// Scalar stored in persisted preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MessageValue {
    /// Boolean.
    Bool(bool),
    /// Integer, including packed colors.
    Int(i64),
    /// String.
    Text(String),
}

impl From<&NormalizedValue> for MessageValue {
    fn from(value: &NormalizedValue) -> Self {
        value.to_message_value()
    }
}

impl From<&MessageValue> for RawValue {
    fn from(value: &MessageValue) -> Self {
        match value {
            MessageValue::Bool(b) => RawValue::Bool(*b),
            MessageValue::Int(i) => RawValue::Int(*i),
            MessageValue::Text(s) => RawValue::Text(s.clone()),
        }
    }
}

/// Validated message for the device, ordered by key.
pub type EncodedMessage = BTreeMap<MessageKey, NormalizedValue>;

/// Preferences as last saved, keyed by the message keys of the schema
/// version that saved them.
pub type PersistedPreferences = BTreeMap<MessageKey, MessageValue>;
