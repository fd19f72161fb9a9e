use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::data::value::{MessageKey, OptionValue, RawValue};

/// One entry of the Clay settings page definition.
///
/// This is the shape found in the JSON file: sections nest their items.
/// [`Schema`](crate::data::Schema) flattens it into sections of
/// [`SchemaItem`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemDef {
    /// Group of items, optionally gated on capabilities.
    Section(SectionDef),
    /// Heading text.
    Heading(MarkerItem),
    /// Free text.
    Text(MarkerItem),
    /// Submit button.
    Submit(MarkerItem),
    /// Color picker.
    Color(ColorItem),
    /// Drop-down selection.
    Select(SelectItem),
    /// Radio button group.
    Radiogroup(SelectItem),
    /// On/off switch.
    Toggle(ToggleItem),
}

/// A `section` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionDef {
    /// Capabilities required by every item in the section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Items of the section, in display order.
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

/// Display-only item: heading, text or submit button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkerItem {
    /// Displayed text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Required capabilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

/// Color picker item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorItem {
    /// Key of the value in the message.
    pub message_key: MessageKey,
    /// Control label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Hex string or integer used when nothing was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RawValue>,
    /// Whether gray (R=G=B) colors are accepted.
    ///
    /// Clay files write this as either `true` or `"true"`.
    #[serde(default, deserialize_with = "loose_bool")]
    #[schemars(with = "bool")]
    pub allow_gray: bool,
    /// Required capabilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

/// One option of a selection item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    /// Displayed text.
    pub label: String,
    /// Value sent to the device.
    pub value: OptionValue,
}

/// `select` or `radiogroup` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectItem {
    /// Key of the value in the message.
    pub message_key: MessageKey,
    /// Control label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Option value used when nothing was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RawValue>,
    /// Allowed options, in display order.
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Required capabilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

impl SelectItem {
    /// Option selected by a submitted value, if any.
    pub fn find_option(&self, raw: &RawValue) -> Option<&SelectOption> {
        self.options.iter().find(|option| option.value.matches(raw))
    }
}

/// `toggle` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleItem {
    /// Key of the value in the message.
    pub message_key: MessageKey,
    /// Control label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// State used when nothing was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RawValue>,
    /// Required capabilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

/// A settings item inside a schema section.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaItem {
    /// Heading text.
    Heading(MarkerItem),
    /// Free text.
    Text(MarkerItem),
    /// Submit button.
    Submit(MarkerItem),
    /// Color picker.
    Color(ColorItem),
    /// Drop-down selection.
    Select(SelectItem),
    /// Radio button group.
    Radiogroup(SelectItem),
    /// On/off switch.
    Toggle(ToggleItem),
}

impl SchemaItem {
    /// The Clay `type` name.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaItem::Heading(_) => "heading",
            SchemaItem::Text(_) => "text",
            SchemaItem::Submit(_) => "submit",
            SchemaItem::Color(_) => "color",
            SchemaItem::Select(_) => "select",
            SchemaItem::Radiogroup(_) => "radiogroup",
            SchemaItem::Toggle(_) => "toggle",
        }
    }

    /// Message key for input items, `None` for display-only items.
    pub fn message_key(&self) -> Option<&MessageKey> {
        match self {
            SchemaItem::Heading(_) | SchemaItem::Text(_) | SchemaItem::Submit(_) => None,
            SchemaItem::Color(c) => Some(&c.message_key),
            SchemaItem::Select(s) | SchemaItem::Radiogroup(s) => Some(&s.message_key),
            SchemaItem::Toggle(t) => Some(&t.message_key),
        }
    }

    /// Whether the item produces a message value.
    pub fn is_input(&self) -> bool {
        self.message_key().is_some()
    }

    /// Declared default, if any.
    pub fn default_value(&self) -> Option<&RawValue> {
        match self {
            SchemaItem::Heading(_) | SchemaItem::Text(_) | SchemaItem::Submit(_) => None,
            SchemaItem::Color(c) => c.default_value.as_ref(),
            SchemaItem::Select(s) | SchemaItem::Radiogroup(s) => s.default_value.as_ref(),
            SchemaItem::Toggle(t) => t.default_value.as_ref(),
        }
    }

    /// Capabilities the item itself requires.
    pub fn capabilities(&self) -> &[String] {
        match self {
            SchemaItem::Heading(m) | SchemaItem::Text(m) | SchemaItem::Submit(m) => {
                &m.capabilities
            }
            SchemaItem::Color(c) => &c.capabilities,
            SchemaItem::Select(s) | SchemaItem::Radiogroup(s) => &s.capabilities,
            SchemaItem::Toggle(t) => &t.capabilities,
        }
    }
}

fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Text(String),
    }

    match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Ok(b),
        Loose::Text(s) => match s.trim() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected a boolean, found `{other}`"
            ))),
        },
    }
}
