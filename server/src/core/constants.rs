// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "BusFinder";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "busfinder";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".busfinder";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "busfinder.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BUSFINDER_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "BUSFINDER_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "BUSFINDER_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BUSFINDER_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default body limit for API requests (64 KB)
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for the schedule database path
pub const ENV_DB_PATH: &str = "BUSFINDER_DB_PATH";

/// Environment variable for the store call timeout
pub const ENV_QUERY_TIMEOUT: &str = "BUSFINDER_QUERY_TIMEOUT_SECS";

/// Environment variable for the category map override file
pub const ENV_CATEGORIES_FILE: &str = "BUSFINDER_CATEGORIES_FILE";

// =============================================================================
// SQLite Database
// =============================================================================

/// Default schedule database filename
pub const SQLITE_DB_FILENAME: &str = "busfinder.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite connection acquire timeout in seconds
pub const SQLITE_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// Store call timeout in seconds
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Catalog
// =============================================================================

/// Max memoized (table, column) value lists
pub const DEFAULT_CATALOG_CACHE_MAX_ENTRIES: u64 = 1_000;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
