//! Device dictionary encoding.
//!
//! The watch runtime receives settings as a packed tuple dictionary with
//! numeric keys. Layout, little-endian:
//!
//! ```text
//! u8  tuple count
//! per tuple:
//!   u32 key
//!   u8  type    (1 = C string, 2 = unsigned int, 3 = signed int)
//!   u16 length  (bytes of value)
//!   ..  value
//! ```

use std::collections::BTreeMap;

use crate::{
    data::{EncodedMessage, MessageKey, NormalizedValue, OptionValue, Schema},
    error::DictError,
};

/// First id handed out to keys without an explicit id.
pub const AUTO_KEY_BASE: u32 = 10000;

/// Tuple holds a NUL-terminated string.
pub const TUPLE_CSTRING: u8 = 1;
/// Tuple holds an unsigned integer.
pub const TUPLE_UINT: u8 = 2;
/// Tuple holds a signed integer.
pub const TUPLE_INT: u8 = 3;

/// Numeric ids of message keys, agreed with the device build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTable {
    ids: BTreeMap<MessageKey, u32>,
}

impl KeyTable {
    /// Ids for every key of `schema`.
    ///
    /// Keys listed in `explicit` keep their id. The others get ids from
    /// [`AUTO_KEY_BASE`] upwards in declaration order, skipping ids already
    /// taken.
    pub fn from_schema(schema: &Schema, explicit: &BTreeMap<String, u32>) -> Self {
        let mut ids: BTreeMap<MessageKey, u32> = explicit
            .iter()
            .map(|(key, id)| (MessageKey::new(key.as_str()), *id))
            .collect();
        let mut taken: Vec<u32> = ids.values().copied().collect();

        let mut next = AUTO_KEY_BASE;
        for (_, _, key) in schema.input_items() {
            if ids.contains_key(key) {
                continue;
            }
            while taken.contains(&next) {
                next += 1;
            }
            ids.insert(key.clone(), next);
            taken.push(next);
        }
        Self { ids }
    }

    /// Id of `key`.
    pub fn id(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    /// All mappings, ordered by key name.
    pub fn iter(&self) -> impl Iterator<Item = (&MessageKey, u32)> {
        self.ids.iter().map(|(key, id)| (key, *id))
    }
}

/// Pack `message` into the device dictionary.
pub fn encode_dict(message: &EncodedMessage, keys: &KeyTable) -> Result<Vec<u8>, DictError> {
    let count = u8::try_from(message.len())
        .map_err(|_| DictError::TooManyTuples { count: message.len() })?;

    let mut buf = vec![count];
    for (key, value) in message {
        let id = keys
            .id(key.as_str())
            .ok_or_else(|| DictError::UnmappedKey { key: key.clone() })?;

        let (kind, bytes) = match value {
            NormalizedValue::Color(color) => (TUPLE_UINT, color.value().to_le_bytes().to_vec()),
            NormalizedValue::Toggle(on) => (TUPLE_UINT, u32::from(*on).to_le_bytes().to_vec()),
            NormalizedValue::Choice(OptionValue::Int(i)) => {
                let v = i32::try_from(*i).map_err(|_| DictError::IntegerOutOfRange {
                    key: key.clone(),
                    value: *i,
                })?;
                (TUPLE_INT, v.to_le_bytes().to_vec())
            }
            NormalizedValue::Choice(OptionValue::Text(s)) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                (TUPLE_CSTRING, bytes)
            }
        };
        let len = u16::try_from(bytes.len()).map_err(|_| DictError::ValueTooLong {
            key: key.clone(),
            len: bytes.len(),
        })?;

        buf.extend_from_slice(&id.to_le_bytes());
        buf.push(kind);
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&bytes);
    }
    Ok(buf)
}
