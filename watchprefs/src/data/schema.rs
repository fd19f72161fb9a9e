use std::{collections::BTreeSet, fmt, fs, mem, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    config::GrayPolicy,
    data::{
        item::{ItemDef, SchemaItem},
        value::MessageKey,
    },
    error::SchemaError,
    validate::validate,
};

/// Version of a settings schema.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct SchemaVersion(pub u32);

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Ordered group of items sharing capability requirements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Capabilities required by every item of the section.
    pub capabilities: Vec<String>,
    /// Items in display order.
    pub items: Vec<SchemaItem>,
}

/// The settings page definition of one schema version.
///
/// Construction checks that every input item has a non-empty message key,
/// that keys are unique, and that declared defaults validate.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    version: SchemaVersion,
    sections: Vec<Section>,
}

impl Schema {
    /// Build a schema from already sectioned items.
    pub fn new(version: SchemaVersion, sections: Vec<Section>) -> Result<Self, SchemaError> {
        let schema = Self { version, sections };
        schema.check()?;
        Ok(schema)
    }

    /// Build a schema from a Clay item list.
    ///
    /// Top-level items outside a `section` are grouped into implicit
    /// sections, keeping document order. Nested sections inherit their
    /// parent's capabilities.
    pub fn from_defs(version: SchemaVersion, defs: Vec<ItemDef>) -> Result<Self, SchemaError> {
        let mut sections = Vec::new();
        collect_sections(defs, &[], &mut sections);
        Self::new(version, sections)
    }

    /// Parse a Clay JSON item list.
    pub fn from_json_str(version: SchemaVersion, json: &str) -> Result<Self, SchemaError> {
        let defs: Vec<ItemDef> = serde_json::from_str(json)?;
        Self::from_defs(version, defs)
    }

    /// Read and parse a Clay JSON file.
    pub fn from_path(version: SchemaVersion, path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(version, &content)
    }

    /// Schema version.
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All items with their section, in display order.
    pub fn items(&self) -> impl Iterator<Item = (&Section, &SchemaItem)> {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter().map(move |item| (section, item)))
    }

    /// Input items with their section and message key.
    pub fn input_items(&self) -> impl Iterator<Item = (&Section, &SchemaItem, &MessageKey)> {
        self.items()
            .filter_map(|(section, item)| item.message_key().map(|key| (section, item, key)))
    }

    /// Input item declaring `key`.
    pub fn find(&self, key: &str) -> Option<&SchemaItem> {
        self.input_items()
            .find(|(_, _, k)| k.as_str() == key)
            .map(|(_, item, _)| item)
    }

    /// Every message key of the schema, active or not.
    pub fn message_keys(&self) -> BTreeSet<&MessageKey> {
        self.input_items().map(|(_, _, key)| key).collect()
    }

    fn check(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for (_, item, key) in self.input_items() {
            if key.as_str().trim().is_empty() {
                return Err(SchemaError::EmptyMessageKey { kind: item.kind() });
            }
            if !seen.insert(key) {
                return Err(SchemaError::DuplicateMessageKey { key: key.clone() });
            }
            if item.default_value().is_some() {
                validate(item, None, GrayPolicy::Reject).map_err(|source| {
                    SchemaError::InvalidDefault {
                        key: key.clone(),
                        source,
                    }
                })?;
            }
        }
        debug!(
            "schema {} loaded: {} sections, {} input items",
            self.version,
            self.sections.len(),
            seen.len()
        );
        Ok(())
    }
}

fn collect_sections(defs: Vec<ItemDef>, inherited: &[String], out: &mut Vec<Section>) {
    let mut pending = Vec::new();
    for def in defs {
        let item = match def {
            ItemDef::Section(section) => {
                flush_section(&mut pending, inherited, out);
                let mut capabilities = inherited.to_vec();
                capabilities.extend(section.capabilities);
                collect_sections(section.items, &capabilities, out);
                continue;
            }
            ItemDef::Heading(m) => SchemaItem::Heading(m),
            ItemDef::Text(m) => SchemaItem::Text(m),
            ItemDef::Submit(m) => SchemaItem::Submit(m),
            ItemDef::Color(c) => SchemaItem::Color(c),
            ItemDef::Select(s) => SchemaItem::Select(s),
            ItemDef::Radiogroup(s) => SchemaItem::Radiogroup(s),
            ItemDef::Toggle(t) => SchemaItem::Toggle(t),
        };
        pending.push(item);
    }
    flush_section(&mut pending, inherited, out);
}

fn flush_section(pending: &mut Vec<SchemaItem>, capabilities: &[String], out: &mut Vec<Section>) {
    if pending.is_empty() {
        return;
    }
    out.push(Section {
        capabilities: capabilities.to_vec(),
        items: mem::take(pending),
    });
}
