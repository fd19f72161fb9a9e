//! Error types.
//!
//! Validation problems are collected per field into [`ValidationErrors`] so
//! the page can show all of them at once. Store and transport failures end
//! the submission and are reported through [`SubmitError`].

use std::{fmt, io, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::{color::Rgb, data::MessageKey};

/// Why a single submitted value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    /// Not a 24-bit color.
    #[error("`{value}` is not a 24-bit RGB color")]
    InvalidColorFormat {
        /// The rejected input.
        value: String,
    },
    /// Gray color on an item that does not allow gray.
    #[error("gray color {color} is not allowed")]
    GrayNotAllowed {
        /// The decoded color.
        color: Rgb,
    },
    /// Value is not one of the declared options.
    #[error("`{value}` is not one of {allowed:?}")]
    InvalidOption {
        /// The rejected input.
        value: String,
        /// Declared option values.
        allowed: Vec<String>,
    },
    /// Nothing was submitted and the item has no default.
    #[error("no value submitted and no default declared")]
    MissingRequiredValue,
    /// Value of the wrong type for the control.
    #[error("expected {expected}, found `{actual}`")]
    TypeMismatch {
        /// Expected kind of value.
        expected: &'static str,
        /// The rejected input.
        actual: String,
    },
}

/// A validation error attached to the message key it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Key of the offending item.
    pub key: MessageKey,
    /// What was wrong.
    pub error: ValidationError,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

/// Every validation error of one submission, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Record an error for `key`.
    pub fn push(&mut self, key: MessageKey, error: ValidationError) {
        self.0.push(FieldError { key, error });
    }

    /// No errors recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in schema order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// First error recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&ValidationError> {
        self.0
            .iter()
            .find(|field| field.key.as_str() == key)
            .map(|field| &field.error)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid setting(s)", self.0.len())?;
        for (i, field) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Problems found while loading a schema definition.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema {}: {source}", .path.display())]
    Io {
        /// Schema file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The definition is not a valid item list.
    #[error("malformed schema: {0}")]
    Parse(#[from] serde_json::Error),
    /// An input item declares an empty message key.
    #[error("{kind} item has an empty messageKey")]
    EmptyMessageKey {
        /// Item type.
        kind: &'static str,
    },
    /// Two input items share a message key.
    #[error("messageKey `{key}` is declared more than once")]
    DuplicateMessageKey {
        /// The repeated key.
        key: MessageKey,
    },
    /// An item's default does not validate against the item itself.
    #[error("invalid default for `{key}`: {source}")]
    InvalidDefault {
        /// Key of the item.
        key: MessageKey,
        /// Why the default is invalid.
        #[source]
        source: ValidationError,
    },
}

/// Failure reported by a preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The stored content could not be decoded or encoded.
    #[error("malformed preferences in {}: {message}", .path.display())]
    Format {
        /// Backing file path.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
    /// The file extension names no supported format.
    #[error("unsupported preferences file extension: {ext:?}")]
    UnsupportedFormat {
        /// The extension found.
        ext: String,
    },
    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Failure while building the device dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    /// The message key has no numeric id.
    #[error("message key `{key}` has no numeric id")]
    UnmappedKey {
        /// The key.
        key: MessageKey,
    },
    /// The dictionary header counts tuples in one byte.
    #[error("{count} tuples exceed the dictionary limit of 255")]
    TooManyTuples {
        /// Number of tuples requested.
        count: usize,
    },
    /// Integer value does not fit a 32-bit tuple.
    #[error("value {value} of `{key}` does not fit in 32 bits")]
    IntegerOutOfRange {
        /// The key.
        key: MessageKey,
        /// The value.
        value: i64,
    },
    /// String value longer than a tuple can hold.
    #[error("string value of `{key}` is {len} bytes, too long for one tuple")]
    ValueTooLong {
        /// The key.
        key: MessageKey,
        /// Encoded length including the terminator.
        len: usize,
    },
}

/// Failure reported by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The message could not be encoded for the device.
    #[error(transparent)]
    Dict(#[from] DictError),
    /// Writing to the link failed.
    #[error("failed to deliver message: {0}")]
    Io(#[from] io::Error),
    /// The receiving side refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// At least one submitted value is invalid. Nothing was loaded or saved.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// Loading or saving preferences failed.
    #[error("persistence failed: {0}")]
    PersistenceFailed(#[source] StoreError),
    /// Delivering the message failed. Nothing was saved.
    #[error("transport failed: {0}")]
    TransportFailed(#[source] TransportError),
}
