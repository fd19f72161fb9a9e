//! Session configuration.
//!
//! Configuration files are TOML or JSON, chosen by extension:
//!
//! ```toml
//! schema_version = 2
//! platform = "chalk"
//! capabilities = ["HEALTH"]
//! gray_policy = "reject"
//! ```

use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    capability::{CapabilitySet, Platform},
    data::SchemaVersion,
};

/// What to do with a gray color on an item that does not allow gray.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GrayPolicy {
    /// Fail with `GrayNotAllowed`.
    #[default]
    Reject,
    /// Replace with the nearest non-gray palette color.
    Clamp,
}

/// Per-session settings threaded through every submission.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SessionConfig {
    /// Version of the settings schema in use.
    pub schema_version: SchemaVersion,
    /// Platform of the connected watch.
    pub platform: Option<Platform>,
    /// Capability tags in addition to the platform's.
    pub capabilities: Vec<String>,
    /// Handling of gray colors on items without `allowGray`.
    pub gray_policy: GrayPolicy,
}

impl SessionConfig {
    /// Effective capability set: platform tags plus the extra tags.
    pub fn capability_set(&self) -> CapabilitySet {
        let mut set = self
            .platform
            .map(Platform::capabilities)
            .unwrap_or_default();
        set.extend(self.capabilities.iter().cloned());
        set
    }
}

/// Failure while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// JSON decoding failed.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML decoding failed.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// Unknown extension.
    #[error("unsupported config file extension: {0:?}")]
    UnsupportedExtension(String),
}

/// Decode `content` as the format named by `ext`.
pub fn from_str_by_ext<C: DeserializeOwned>(content: &str, ext: &str) -> Result<C, ConfigError> {
    let c = match ext {
        "json" => serde_json::from_str::<C>(content)?,
        "toml" | "tml" => toml::from_str::<C>(content)?,
        _ => return Err(ConfigError::UnsupportedExtension(ext.to_string())),
    };
    Ok(c)
}

/// Load a typed configuration file.
pub fn load_config<C: DeserializeOwned>(path: impl AsRef<Path>) -> Result<C, ConfigError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!("loading config {}", path.display());
    from_str_by_ext(&content, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_config() {
        let config: SessionConfig = from_str_by_ext(
            r#"
            schema_version = 2
            platform = "chalk"
            capabilities = ["EXTRA"]
            gray_policy = "clamp"
            "#,
            "toml",
        )
        .unwrap();

        assert_eq!(config.schema_version, SchemaVersion(2));
        assert_eq!(config.gray_policy, GrayPolicy::Clamp);
        let caps = config.capability_set();
        assert!(caps.contains("COLOR"));
        assert!(caps.contains("EXTRA"));
    }

    #[test]
    fn test_defaults() {
        let config: SessionConfig = from_str_by_ext("{}", "json").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.gray_policy, GrayPolicy::Reject);
        assert!(config.capability_set().is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = from_str_by_ext::<SessionConfig>("", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedExtension(ext) if ext == "yaml"));
    }
}
