//! Application context and project configuration.
//!
//! The project configuration is typically stored in `.watchprefs.toml`:
//!
//! ```toml
//! schema = "${workspaceFolder}/src/pkjs/config.json"
//! preferences = ".prefs.json"
//! schema_version = 2
//! platform = "chalk"
//!
//! [message_keys]
//! backgroundColor = 10000
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use colored::Colorize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use watchprefs::{
    Platform, Schema, SessionConfig,
    config::load_config,
    dict::KeyTable,
    store::FileStore,
};

/// Default project configuration file name.
pub const DEFAULT_CONFIG: &str = ".watchprefs.toml";

/// Project configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProjectConfig {
    /// Clay settings page definition (JSON).
    pub schema: PathBuf,
    /// Persisted preferences file (`.json` or `.toml`).
    pub preferences: PathBuf,
    /// Numeric ids agreed with the watch build. Unlisted keys are numbered
    /// from 10000 in schema order.
    #[serde(default)]
    pub message_keys: BTreeMap<String, u32>,
    /// Session settings.
    #[serde(flatten)]
    pub session: SessionConfig,
}

/// The main application context holding all state.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Directory relative paths are resolved against.
    pub workspace: PathBuf,
    /// Loaded project configuration.
    pub config: ProjectConfig,
}

impl AppContext {
    /// Load the project configuration.
    ///
    /// `config_path` defaults to `.watchprefs.toml` in the current directory.
    pub fn load(config_path: Option<PathBuf>, platform: Option<Platform>) -> anyhow::Result<Self> {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
        let mut config: ProjectConfig = load_config(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        if platform.is_some() {
            config.session.platform = platform;
        }

        let workspace = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!("project config: {config:?}");
        Ok(Self { workspace, config })
    }

    /// Replaces `${workspaceFolder}` and anchors relative paths at the
    /// workspace.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let raw = path.to_string_lossy().replace(
            "${workspaceFolder}",
            format!("{}", self.workspace.display()).as_ref(),
        );
        let resolved = PathBuf::from(raw);
        if resolved.is_relative() {
            self.workspace.join(resolved)
        } else {
            resolved
        }
    }

    /// Loads the settings schema.
    pub fn schema(&self) -> anyhow::Result<Schema> {
        let path = self.resolve(&self.config.schema);
        let schema = Schema::from_path(self.config.session.schema_version, &path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?;
        println!(
            "{}",
            format!(
                "Schema {} loaded from {}",
                schema.version(),
                path.display()
            )
            .bold()
            .purple()
        );
        Ok(schema)
    }

    /// Opens the preference store.
    pub fn store(&self) -> anyhow::Result<FileStore> {
        let path = self.resolve(&self.config.preferences);
        let store = FileStore::new(&path, self.config.session.schema_version)?;
        Ok(store)
    }

    /// Numeric ids for the keys of `schema`.
    pub fn key_table(&self, schema: &Schema) -> KeyTable {
        KeyTable::from_schema(schema, &self.config.message_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(DEFAULT_CONFIG);
        std::fs::write(
            &config_path,
            r#"
            schema = "${workspaceFolder}/config.json"
            preferences = "prefs.toml"
            schema_version = 3
            platform = "basalt"

            [message_keys]
            backgroundColor = 1
            "#,
        )
        .unwrap();

        let ctx = AppContext::load(Some(config_path), Some(Platform::Chalk)).unwrap();
        assert_eq!(ctx.config.session.platform, Some(Platform::Chalk));
        assert_eq!(ctx.config.session.schema_version.0, 3);
        assert_eq!(ctx.config.message_keys.get("backgroundColor"), Some(&1));
        assert_eq!(
            ctx.resolve(&ctx.config.schema),
            dir.path().join("config.json")
        );
        assert_eq!(
            ctx.resolve(&ctx.config.preferences),
            dir.path().join("prefs.toml")
        );
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppContext::load(Some(dir.path().join("nope.toml")), None).is_err());
    }
}
