use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::path::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CATALOG_CACHE_MAX_ENTRIES, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_QUERY_TIMEOUT_SECS, SQLITE_ACQUIRE_TIMEOUT_SECS, SQLITE_DB_FILENAME,
    SQLITE_MAX_CONNECTIONS,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Path to the SQLite schedule database
    pub path: Option<String>,
    /// Maximum number of connections in the pool (default: 5)
    pub max_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 10)
    pub acquire_timeout_secs: Option<u64>,
    /// Per-call query timeout in seconds (default: 30)
    pub query_timeout_secs: Option<u64>,
}

/// Catalog configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileConfig {
    /// Maximum memoized (table, column) value lists
    pub cache_max_entries: Option<u64>,
    /// JSON file replacing the bundled category map
    pub categories_file: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub catalog: Option<CatalogFileConfig>,
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

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        // Database
        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                tracing::trace!(path = ?database.path, "Merging database.path");
                current.path = database.path;
            }
            if database.max_connections.is_some() {
                tracing::trace!(max_connections = ?database.max_connections, "Merging database.max_connections");
                current.max_connections = database.max_connections;
            }
            if database.acquire_timeout_secs.is_some() {
                tracing::trace!(acquire_timeout_secs = ?database.acquire_timeout_secs, "Merging database.acquire_timeout_secs");
                current.acquire_timeout_secs = database.acquire_timeout_secs;
            }
            if database.query_timeout_secs.is_some() {
                tracing::trace!(query_timeout_secs = ?database.query_timeout_secs, "Merging database.query_timeout_secs");
                current.query_timeout_secs = database.query_timeout_secs;
            }
        }

        // Catalog
        if let Some(catalog) = other.catalog {
            let current = self.catalog.get_or_insert_with(CatalogFileConfig::default);
            if catalog.cache_max_entries.is_some() {
                tracing::trace!(cache_max_entries = ?catalog.cache_max_entries, "Merging catalog.cache_max_entries");
                current.cache_max_entries = catalog.cache_max_entries;
            }
            if catalog.categories_file.is_some() {
                tracing::trace!(categories_file = ?catalog.categories_file, "Merging catalog.categories_file");
                current.categories_file = catalog.categories_file;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Schedule database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub cache_max_entries: u64,
    /// `None` uses the bundled category map
    pub categories_file: Option<PathBuf>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.busfinder/busfinder.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.busfinder/busfinder.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
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

        let config = Self::from_layers(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            db = %config.database.path.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Layer defaults -> merged file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_catalog = file_config.catalog.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let db_path = cli
            .db_path
            .clone()
            .or(file_database.path)
            .unwrap_or_else(|| SQLITE_DB_FILENAME.to_string());

        let database = DatabaseConfig {
            path: expand_path(&db_path),
            max_connections: file_database
                .max_connections
                .unwrap_or(SQLITE_MAX_CONNECTIONS),
            acquire_timeout_secs: file_database
                .acquire_timeout_secs
                .unwrap_or(SQLITE_ACQUIRE_TIMEOUT_SECS),
            query_timeout_secs: cli
                .query_timeout_secs
                .or(file_database.query_timeout_secs)
                .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
        };

        let catalog = CatalogConfig {
            cache_max_entries: file_catalog
                .cache_max_entries
                .unwrap_or(DEFAULT_CATALOG_CACHE_MAX_ENTRIES),
            categories_file: cli
                .categories_file
                .clone()
                .or(file_catalog.categories_file)
                .map(|p| expand_path(&p)),
        };

        Self {
            server: ServerConfig { host, port },
            database,
            catalog,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        // Host must not be empty
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port must be non-zero (port 0 would cause bind failure)
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Configuration error: database.max_connections must be greater than 0");
        }
        if self.database.acquire_timeout_secs == 0 {
            anyhow::bail!(
                "Configuration error: database.acquire_timeout_secs must be greater than 0"
            );
        }
        if self.database.query_timeout_secs == 0 {
            anyhow::bail!("Configuration error: database.query_timeout_secs must be greater than 0");
        }
        if self.catalog.cache_max_entries == 0 {
            anyhow::bail!("Configuration error: catalog.cache_max_entries must be greater than 0");
        }

        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Server binds to all interfaces; the API has no authentication"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.busfinder/busfinder.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
