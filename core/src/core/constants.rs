// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "restfilter";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "restfilter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "RESTFILTER_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "RESTFILTER_LOG";

/// Environment variable overriding the maximum number of filters
pub const ENV_MAX_FILTERS: &str = "RESTFILTER_MAX_FILTERS";

/// Environment variable overriding the maximum raw value size
pub const ENV_MAX_VALUE_BYTES: &str = "RESTFILTER_MAX_VALUE_BYTES";

// =============================================================================
// Filter Defaults
// =============================================================================

/// Maximum number of filters per request
pub const DEFAULT_MAX_FILTERS: usize = 50;

/// Maximum size of a single raw filter value in bytes (64KB)
pub const DEFAULT_MAX_VALUE_BYTES: usize = 64 * 1024;

/// Operator applied when a parameter key carries no operator segment
pub const DEFAULT_OPERATOR: &str = "exact";
