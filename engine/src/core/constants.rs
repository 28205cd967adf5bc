// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths, identifiers and log targets)
pub const APP_NAME_LOWER: &str = "contentquery";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".contentquery";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "contentquery.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CONTENTQUERY_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CONTENTQUERY_LOG";

/// Environment variable for the SQL dialect
pub const ENV_DIALECT: &str = "CONTENTQUERY_DIALECT";

/// Environment variable for the SQLite database used by `run`
pub const ENV_DATABASE: &str = "CONTENTQUERY_DATABASE";

// =============================================================================
// Query Parameters
// =============================================================================

/// Longest accepted raw value in bytes
pub const MAX_VALUE_LENGTH: usize = 1024;

/// Separator for multi-field keys and values (`title|||body=a|||b`)
pub const MULTI_FIELD_SEPARATOR: &str = "|||";

/// Columns every content table carries
pub const CORE_FIELDS: &[&str] = &[
    "id",
    "slug",
    "status",
    "datecreated",
    "datechanged",
    "datepublish",
    "ownerid",
];

// =============================================================================
// SQLite Configuration
// =============================================================================

/// Maximum connections in the executor pool
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// Busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;
