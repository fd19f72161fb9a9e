//! Per-item validation.
//!
//! [`validate`] turns one submitted value into a [`NormalizedValue`]. When
//! nothing was submitted the item's declared default goes through the same
//! checks.

use crate::{
    color::{Rgb, nearest_non_gray},
    config::GrayPolicy,
    data::{
        NormalizedValue, RawValue,
        item::{ColorItem, SchemaItem, SelectItem},
    },
    error::ValidationError,
};

/// Validate and normalize the value of one item.
///
/// Display-only items have no value; asking for one yields
/// [`ValidationError::MissingRequiredValue`].
pub fn validate(
    item: &SchemaItem,
    raw: Option<&RawValue>,
    policy: GrayPolicy,
) -> Result<NormalizedValue, ValidationError> {
    let raw = raw
        .or_else(|| item.default_value())
        .ok_or(ValidationError::MissingRequiredValue)?;

    match item {
        SchemaItem::Heading(_) | SchemaItem::Text(_) | SchemaItem::Submit(_) => {
            Err(ValidationError::MissingRequiredValue)
        }
        SchemaItem::Color(color) => validate_color(color, raw, policy).map(NormalizedValue::Color),
        SchemaItem::Select(select) | SchemaItem::Radiogroup(select) => {
            validate_choice(select, raw)
        }
        SchemaItem::Toggle(_) => validate_toggle(raw),
    }
}

fn validate_color(item: &ColorItem, raw: &RawValue, policy: GrayPolicy) -> Result<Rgb, ValidationError> {
    let color = match raw {
        RawValue::Text(s) => Rgb::parse_hex(s),
        RawValue::Int(i) => u32::try_from(*i).ok().and_then(Rgb::new),
        RawValue::Bool(_) => None,
    }
    .ok_or_else(|| ValidationError::InvalidColorFormat {
        value: raw.to_string(),
    })?;

    if item.allow_gray || !color.is_gray() {
        return Ok(color);
    }

    match policy {
        GrayPolicy::Reject => Err(ValidationError::GrayNotAllowed { color }),
        GrayPolicy::Clamp => {
            let clamped = nearest_non_gray(color);
            debug!(
                "{}: gray {color} clamped to {clamped}",
                item.message_key
            );
            Ok(clamped)
        }
    }
}

fn validate_choice(item: &SelectItem, raw: &RawValue) -> Result<NormalizedValue, ValidationError> {
    item.find_option(raw)
        .map(|option| NormalizedValue::Choice(option.value.clone()))
        .ok_or_else(|| ValidationError::InvalidOption {
            value: raw.to_string(),
            allowed: item.options.iter().map(|o| o.value.to_string()).collect(),
        })
}

fn validate_toggle(raw: &RawValue) -> Result<NormalizedValue, ValidationError> {
    match raw {
        RawValue::Bool(b) => Ok(NormalizedValue::Toggle(*b)),
        RawValue::Text(s) if s == "true" => Ok(NormalizedValue::Toggle(true)),
        RawValue::Text(s) if s == "false" => Ok(NormalizedValue::Toggle(false)),
        other => Err(ValidationError::TypeMismatch {
            expected: "boolean",
            actual: other.to_string(),
        }),
    }
}
