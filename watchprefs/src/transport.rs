//! Transport port.

use std::io::Write;

use crate::{
    data::EncodedMessage,
    dict::{KeyTable, encode_dict},
    error::TransportError,
};

/// Hands a validated message to the device link.
///
/// Retrying is the implementation's business; the core calls `send` once
/// per submission.
pub trait Transport {
    /// Deliver `message`.
    fn send(&mut self, message: &EncodedMessage) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, message: &EncodedMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Packs messages into the device dictionary and writes them out.
pub struct DictTransport<W> {
    keys: KeyTable,
    writer: W,
}

impl<W: Write> DictTransport<W> {
    /// Transport writing to `writer` with ids from `keys`.
    pub fn new(keys: KeyTable, writer: W) -> Self {
        Self { keys, writer }
    }

    /// Key table in use.
    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for DictTransport<W> {
    fn send(&mut self, message: &EncodedMessage) -> Result<(), TransportError> {
        let bytes = encode_dict(message, &self.keys)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        debug!("sent {} tuples in {} bytes", message.len(), bytes.len());
        Ok(())
    }
}

/// Keeps every sent message, or refuses them all.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    /// Messages received so far.
    pub sent: Vec<EncodedMessage>,
    /// When set, every send fails with this reason.
    pub reject_with: Option<String>,
}

impl RecordingTransport {
    /// Transport accepting every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport refusing every message.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            sent: Vec::new(),
            reject_with: Some(reason.into()),
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, message: &EncodedMessage) -> Result<(), TransportError> {
        if let Some(reason) = &self.reject_with {
            return Err(TransportError::Rejected(reason.clone()));
        }
        self.sent.push(message.clone());
        Ok(())
    }
}
