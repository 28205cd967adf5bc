use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::sql::Backend;
use crate::domain::content_types::ContentTypeConfig;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME};

// =============================================================================
// File Configuration
// =============================================================================

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub dialect: Option<Backend>,
    pub database: Option<String>,
    pub whitelist: Option<Vec<String>>,
    pub content_types: Option<BTreeMap<String, ContentTypeConfig>>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence).
    /// Content types merge by name; a redefined type replaces the old one.
    fn merge(&mut self, other: FileConfig) {
        if other.dialect.is_some() {
            tracing::trace!(dialect = ?other.dialect, "Merging dialect");
            self.dialect = other.dialect;
        }
        if other.database.is_some() {
            tracing::trace!(database = ?other.database, "Merging database");
            self.database = other.database;
        }
        if other.whitelist.is_some() {
            tracing::trace!(whitelist = ?other.whitelist, "Merging whitelist");
            self.whitelist = other.whitelist;
        }
        if let Some(content_types) = other.content_types {
            let current = self.content_types.get_or_insert_with(BTreeMap::new);
            for (name, content_type) in content_types {
                tracing::trace!(content_type = %name, "Merging content type");
                current.insert(name, content_type);
            }
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dialect: Backend,
    pub database: Option<String>,
    /// Keys accepted for every content type (empty: all keys)
    pub whitelist: Vec<String>,
    pub content_types: BTreeMap<String, ContentTypeConfig>,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.contentquery/contentquery.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self {
            dialect: cli.dialect.or(file_config.dialect).unwrap_or_default(),
            database: cli.database.clone().or(file_config.database),
            whitelist: file_config.whitelist.unwrap_or_default(),
            content_types: file_config.content_types.unwrap_or_default(),
        };

        config.validate()?;

        tracing::debug!(
            dialect = %config.dialect,
            content_types = config.content_types.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(database) = &self.database
            && database.trim().is_empty()
        {
            anyhow::bail!("database must not be empty when set");
        }

        if self.content_types.is_empty() {
            tracing::warn!("No content types configured, only core fields can be queried");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.contentquery/contentquery.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
