//! Capability gating.
//!
//! Items and sections may list required capability tags. A tag prefixed with
//! `NOT_` is satisfied when the device lacks the tag, so `NOT_BW` selects
//! color watches.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data::{SchemaItem, Section};

/// Capability tags declared by the connected device.
pub type CapabilitySet = BTreeSet<String>;

const NEGATION_PREFIX: &str = "NOT_";

/// Whether every requirement in `required` holds for `capabilities`.
pub fn satisfies(required: &[String], capabilities: &CapabilitySet) -> bool {
    required
        .iter()
        .all(|tag| match tag.strip_prefix(NEGATION_PREFIX) {
            Some(absent) => !capabilities.contains(absent),
            None => capabilities.contains(tag),
        })
}

/// Whether an item takes part in the current session.
pub fn is_active(item: &SchemaItem, capabilities: &CapabilitySet) -> bool {
    satisfies(item.capabilities(), capabilities)
}

/// Whether a section takes part in the current session.
pub fn section_active(section: &Section, capabilities: &CapabilitySet) -> bool {
    satisfies(&section.capabilities, capabilities)
}

/// Known watch platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Original black and white, rectangular.
    Aplite,
    /// Color, rectangular.
    Basalt,
    /// Color, round.
    Chalk,
    /// Black and white, rectangular, with health sensors.
    Diorite,
    /// Color, rectangular, large display.
    Emery,
}

impl Platform {
    /// Capability tags of the platform.
    pub fn capabilities(self) -> CapabilitySet {
        let tags: &[&str] = match self {
            Platform::Aplite => &["PLATFORM_APLITE", "BW", "RECT", "DISPLAY_144x168"],
            Platform::Basalt => &[
                "PLATFORM_BASALT",
                "COLOR",
                "RECT",
                "MICROPHONE",
                "SMARTSTRAPS",
                "SMARTSTRAPS_POWER",
                "HEALTH",
                "DISPLAY_144x168",
            ],
            Platform::Chalk => &[
                "PLATFORM_CHALK",
                "COLOR",
                "ROUND",
                "MICROPHONE",
                "SMARTSTRAPS",
                "SMARTSTRAPS_POWER",
                "HEALTH",
                "DISPLAY_180x180_ROUND",
            ],
            Platform::Diorite => &[
                "PLATFORM_DIORITE",
                "BW",
                "RECT",
                "MICROPHONE",
                "SMARTSTRAPS",
                "HEALTH",
                "DISPLAY_144x168",
            ],
            Platform::Emery => &[
                "PLATFORM_EMERY",
                "COLOR",
                "RECT",
                "MICROPHONE",
                "SMARTSTRAPS",
                "SMARTSTRAPS_POWER",
                "HEALTH",
                "DISPLAY_200x228",
            ],
        };
        tags.iter().map(|tag| tag.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MessageKey, item::ColorItem};

    fn caps(tags: &[&str]) -> CapabilitySet {
        tags.iter().map(|t| t.to_string()).collect()
    }

    fn color_item(required: &[&str]) -> SchemaItem {
        SchemaItem::Color(ColorItem {
            message_key: MessageKey::new("highlightColor"),
            label: None,
            default_value: None,
            allow_gray: false,
            capabilities: required.iter().map(|t| t.to_string()).collect(),
        })
    }

    #[test]
    fn test_ungated_item_always_active() {
        assert!(is_active(&color_item(&[]), &caps(&[])));
        assert!(is_active(&color_item(&[]), &caps(&["COLOR"])));
    }

    #[test]
    fn test_subset_required() {
        let item = color_item(&["COLOR", "ROUND"]);
        assert!(is_active(&item, &caps(&["COLOR", "ROUND", "HEALTH"])));
        assert!(!is_active(&item, &caps(&["COLOR"])));
        assert!(!is_active(&item, &caps(&[])));
    }

    #[test]
    fn test_negated_capability() {
        let item = color_item(&["NOT_BW"]);
        assert!(is_active(&item, &Platform::Chalk.capabilities()));
        assert!(!is_active(&item, &Platform::Aplite.capabilities()));
    }

    #[test]
    fn test_platform_capabilities() {
        let chalk = Platform::Chalk.capabilities();
        assert!(chalk.contains("COLOR"));
        assert!(chalk.contains("ROUND"));
        assert!(!chalk.contains("BW"));
        assert!(Platform::Diorite.capabilities().contains("BW"));
    }
}
