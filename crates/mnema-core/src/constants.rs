/// Folders containing knowledge items, relative to the repository root.
pub const ITEM_FOLDERS: &[&str] = &["10-ideas/", "20-decisions/", "30-projects/"];

/// Extension carried by every knowledge document.
pub const DOC_EXTENSION: &str = ".md";

/// Stable identifier prefix.
pub const ID_PREFIX: &str = "sb-";

/// Number of lowercase hex digits following the identifier prefix.
pub const ID_HEX_LEN: usize = 7;

/// Maximum identifiers displayed per difference list in a health report.
pub const HEALTH_DIFF_DISPLAY_CAP: usize = 10;

/// Default record limit when enumerating a memory namespace.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Default result limit for classifier context retrieval.
pub const DEFAULT_CONTEXT_LIMIT: usize = 10;

/// Default data directory name under home.
pub const DEFAULT_DATA_DIR: &str = ".mnema";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = ".mnema/config.toml";

/// SQLite database file name.
pub const STATE_DB_FILE: &str = "state.db";
