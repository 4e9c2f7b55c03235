use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::filters::{OperatorKind, Registry};

use super::cli::CliConfig;
use super::constants::{CONFIG_FILE_NAME, DEFAULT_MAX_FILTERS, DEFAULT_MAX_VALUE_BYTES};

// =============================================================================
// Filter Config (resolved)
// =============================================================================

/// Limits and operator overrides used by the filter compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub max_filters: usize,
    pub max_value_bytes: usize,
    /// Top-level fields that may be filtered on; `None` allows every field
    pub allowed_fields: Option<Vec<String>>,
    /// field -> operator name -> operator kind
    pub field_operators: BTreeMap<String, BTreeMap<String, OperatorKind>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_filters: DEFAULT_MAX_FILTERS,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
            allowed_fields: None,
            field_operators: BTreeMap::new(),
        }
    }
}

impl FilterConfig {
    /// Baseline registry with the configured field overrides installed
    pub fn build_registry(&self) -> Registry {
        let mut registry = Registry::baseline();
        for (field, operators) in &self.field_operators {
            for (name, kind) in operators {
                registry.register_for_field(field, name, Registry::standard(*kind));
            }
        }
        registry
    }

    /// A path is allowed when it is, or lies under, a whitelisted field
    pub fn is_field_allowed(&self, path: &str) -> bool {
        let Some(allowed) = &self.allowed_fields else {
            return true;
        };
        allowed.iter().any(|field| {
            path == field
                || path
                    .strip_prefix(field.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    fn validate(&self) -> Result<()> {
        if self.max_filters == 0 {
            anyhow::bail!("Configuration error: filters.max_filters must be greater than 0");
        }
        if self.max_value_bytes == 0 {
            anyhow::bail!("Configuration error: filters.max_value_bytes must be greater than 0");
        }
        if let Some(allowed) = &self.allowed_fields
            && allowed.iter().any(|f| f.is_empty())
        {
            anyhow::bail!("Configuration error: filters.allowed_fields must not contain empty names");
        }
        Ok(())
    }
}

// =============================================================================
// File Config (all optional, as read from JSON)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FiltersFileConfig {
    pub max_filters: Option<usize>,
    pub max_value_bytes: Option<usize>,
    pub allowed_fields: Option<Vec<String>>,
    pub field_operators: Option<BTreeMap<String, BTreeMap<String, OperatorKind>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub filters: Option<FiltersFileConfig>,
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
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub filters: FilterConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. CLI-specified config path OR local `restfilter.json`
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        let config = Self::from_sources(file_config, cli);
        config.validate()?;
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_sources(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_filters = file_config.filters.unwrap_or_default();

        let filters = FilterConfig {
            max_filters: cli
                .max_filters
                .or(file_filters.max_filters)
                .unwrap_or(DEFAULT_MAX_FILTERS),
            max_value_bytes: cli
                .max_value_bytes
                .or(file_filters.max_value_bytes)
                .unwrap_or(DEFAULT_MAX_VALUE_BYTES),
            allowed_fields: file_filters.allowed_fields,
            field_operators: file_filters.field_operators.unwrap_or_default(),
        };

        Self { filters }
    }

    fn validate(&self) -> Result<()> {
        self.filters.validate()
    }
}
