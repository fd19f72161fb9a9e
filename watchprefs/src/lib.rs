//! # watchprefs
//!
//! Schema-driven settings encoding and migration for watch apps.
//!
//! A settings page is described by a declarative list of items (the Clay
//! JSON format). `watchprefs` validates what the user submitted against that
//! list, encodes it into a flat message keyed by stable message keys, and
//! reconciles it with preferences saved under earlier schema versions.
//!
//! ## Features
//!
//! - Typed schema items: `color`, `select`, `radiogroup`, `toggle`, plus the
//!   `heading`, `text`, `section` and `submit` markers
//! - Hex color normalization with gray rejection or palette clamping
//! - Capability gating per item and per section (`COLOR`, `NOT_BW`, ...)
//! - Batch validation: every invalid field is reported at once
//! - Key-set migration across schema versions
//! - Compact tuple dictionary encoding for the device runtime
//!
//! ## Quick Start
//!
//! ```rust
//! use watchprefs::{GrayPolicy, RawInput, Schema, SchemaVersion, encode};
//!
//! let schema = Schema::from_json_str(
//!     SchemaVersion(1),
//!     r#"[{"type": "color", "messageKey": "backgroundColor", "defaultValue": "ff0000"}]"#,
//! )
//! .unwrap();
//!
//! let raw: RawInput = serde_json::from_str(r##"{"backgroundColor": "#00FF00"}"##).unwrap();
//! let message = encode(&schema, &raw, &Default::default(), GrayPolicy::Reject).unwrap();
//! assert_eq!(message.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Schema items, schema structure and value types
//! - [`validate`] - Per-item validation and normalization
//! - [`capability`] - Capability gating and platform capability sets
//! - [`encode`] - Schema walk producing the encoded message
//! - [`migrate`] - Reconciliation with persisted preferences
//! - [`store`] / [`transport`] - Persistence and delivery ports
//! - [`dict`] - Device dictionary encoding
//! - [`session`] - One full submission cycle

#[macro_use]
extern crate log;

/// Capability gating and known platform capability sets.
pub mod capability;

/// Color parsing and the device palette.
pub mod color;

/// Session configuration and typed config file loading.
pub mod config;

/// Schema items, schema structure and value types.
pub mod data;

/// Device dictionary encoding.
pub mod dict;

/// Schema walk producing the encoded message.
pub mod encode;

/// Error types shared across the crate.
pub mod error;

/// Reconciliation of a submission with persisted preferences.
pub mod migrate;

/// One full submission cycle over the persistence and transport ports.
pub mod session;

/// Persistence port and its reference adapters.
pub mod store;

/// Transport port and its reference adapters.
pub mod transport;

/// Per-item validation and normalization.
pub mod validate;

pub use capability::{CapabilitySet, Platform, is_active};
pub use color::Rgb;
pub use config::{GrayPolicy, SessionConfig};
pub use data::{
    EncodedMessage, ItemDef, MessageKey, MessageValue, NormalizedValue, OptionValue,
    PersistedPreferences, RawInput, RawValue, Schema, SchemaItem, SchemaVersion, Section,
};
pub use encode::encode;
pub use error::{FieldError, SchemaError, SubmitError, ValidationError, ValidationErrors};
pub use migrate::migrate;
pub use session::{Session, Submission};
pub use store::{FileStore, MemoryStore, PreferenceStore};
pub use transport::{DictTransport, RecordingTransport, Transport};
pub use validate::validate;
