//! One full submission cycle.
//!
//! ```text
//! raw input -> encode -> load -> migrate -> send -> save
//! ```
//!
//! Validation runs first, so an invalid submission never touches the store
//! or the transport. Preferences are saved only once the device took the
//! message.

use crate::{
    capability::CapabilitySet,
    config::SessionConfig,
    data::{EncodedMessage, PersistedPreferences, RawInput, Schema},
    encode::encode,
    error::SubmitError,
    migrate::migrate,
    store::PreferenceStore,
    transport::Transport,
};

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Message handed to the transport.
    pub message: EncodedMessage,
    /// Preferences written to the store.
    pub preferences: PersistedPreferences,
}

/// Settings session for one schema version and one device.
pub struct Session<S, T> {
    schema: Schema,
    config: SessionConfig,
    capabilities: CapabilitySet,
    store: S,
    transport: T,
}

impl<S: PreferenceStore, T: Transport> Session<S, T> {
    /// Start a session.
    pub fn new(schema: Schema, config: SessionConfig, store: S, transport: T) -> Self {
        if schema.version() != config.schema_version {
            warn!(
                "schema is {} but config expects {}",
                schema.version(),
                config.schema_version
            );
        }
        let capabilities = config.capability_set();
        debug!("session capabilities: {capabilities:?}");
        Self {
            schema,
            config,
            capabilities,
            store,
            transport,
        }
    }

    /// Schema of the session.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Effective device capabilities.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// The preference store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Tear the session down.
    pub fn into_parts(self) -> (S, T) {
        (self.store, self.transport)
    }

    /// Preferences to show when the settings page opens.
    ///
    /// Stored values are migrated to the current schema but not saved.
    pub fn open(&self) -> Result<PersistedPreferences, SubmitError> {
        let previous = self.store.load().map_err(SubmitError::PersistenceFailed)?;
        Ok(migrate(
            &EncodedMessage::new(),
            &previous,
            &self.schema,
            self.config.gray_policy,
        ))
    }

    /// Validate, persist and deliver one submission.
    ///
    /// Nothing is saved when delivery fails.
    pub fn submit(&mut self, raw: &RawInput) -> Result<Submission, SubmitError> {
        let policy = self.config.gray_policy;
        let message = encode(&self.schema, raw, &self.capabilities, policy)?;

        let previous = self.store.load().map_err(SubmitError::PersistenceFailed)?;
        let preferences = migrate(&message, &previous, &self.schema, policy);

        self.transport
            .send(&message)
            .map_err(SubmitError::TransportFailed)?;
        self.store
            .save(&preferences)
            .map_err(SubmitError::PersistenceFailed)?;

        info!(
            "submission accepted: {} values sent, {} stored",
            message.len(),
            preferences.len()
        );
        Ok(Submission {
            message,
            preferences,
        })
    }
}
