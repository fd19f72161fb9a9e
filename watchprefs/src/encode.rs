//! Schema walk producing the encoded message.

use crate::{
    capability::{CapabilitySet, is_active, section_active},
    config::GrayPolicy,
    data::{EncodedMessage, RawInput, Schema},
    error::ValidationErrors,
    validate::validate,
};

/// Validate a submission against the active part of `schema`.
///
/// Items in inactive sections, and inactive items, are skipped entirely.
/// Every active input item contributes either a value or an error; if any
/// error was recorded the whole batch is returned and no message is built.
pub fn encode(
    schema: &Schema,
    raw: &RawInput,
    capabilities: &CapabilitySet,
    policy: GrayPolicy,
) -> Result<EncodedMessage, ValidationErrors> {
    let mut message = EncodedMessage::new();
    let mut errors = ValidationErrors::default();

    for (section, item, key) in schema.input_items() {
        if !section_active(section, capabilities) || !is_active(item, capabilities) {
            debug!("{key}: inactive for this device, skipped");
            continue;
        }
        match validate(item, raw.get(key), policy) {
            Ok(value) => {
                message.insert(key.clone(), value);
            }
            Err(e) => errors.push(key.clone(), e),
        }
    }

    for key in raw.keys() {
        if !message.contains_key(key) && errors.get(key.as_str()).is_none() {
            debug!("{key}: not an active item, ignored");
        }
    }

    if errors.is_empty() {
        Ok(message)
    } else {
        Err(errors)
    }
}
