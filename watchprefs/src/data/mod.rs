//! Schema items, schema structure and value types.
//!
//! ## Architecture
//!
//! - [`item`] - Item definitions as they appear in the Clay JSON
//! - [`schema`] - The validated, sectioned schema for one version
//! - [`value`] - Raw input, normalized values and the encoded message

/// Individual settings item definitions.
pub mod item;

/// Sectioned schema for one schema version.
pub mod schema;

/// Raw, normalized and persisted value types.
pub mod value;

pub use item::{ColorItem, ItemDef, MarkerItem, SchemaItem, SectionDef, SelectItem, SelectOption, ToggleItem};
pub use schema::{Schema, SchemaVersion, Section};
pub use value::{
    EncodedMessage, MessageKey, MessageValue, NormalizedValue, OptionValue, PersistedPreferences,
    RawInput, RawValue,
};
