use crate::constants;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repo: RepoConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Path to the knowledge repository root.
    #[serde(default = "default_repo_root")]
    pub root: String,
    /// Folders (relative, trailing slash) containing knowledge items.
    #[serde(default = "default_item_folders")]
    pub item_folders: Vec<String>,
    /// Extension carried by knowledge documents.
    #[serde(default = "default_doc_extension")]
    pub doc_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Base URL of the semantic memory service. Empty means the memory
    /// capability is unavailable and sync degrades to dry passes.
    #[serde(default)]
    pub endpoint: String,
    /// Memory store identifier within the service.
    #[serde(default)]
    pub memory_id: String,
    #[serde(default = "default_memory_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_repo_root() -> String {
    ".".into()
}
fn default_item_folders() -> Vec<String> {
    constants::ITEM_FOLDERS
        .iter()
        .map(|folder| (*folder).to_string())
        .collect()
}
fn default_doc_extension() -> String {
    constants::DOC_EXTENSION.into()
}
fn default_data_dir() -> String {
    "~/.mnema".into()
}
fn default_busy_timeout() -> u32 {
    5000
}
fn default_memory_timeout() -> u64 {
    5000
}
fn default_list_limit() -> usize {
    constants::DEFAULT_LIST_LIMIT
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            root: default_repo_root(),
            item_folders: default_item_folders(),
            doc_extension: default_doc_extension(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            memory_id: String::new(),
            timeout_ms: default_memory_timeout(),
            list_limit: default_list_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MemoryConfig {
    /// The memory capability is configured when both endpoint and store
    /// id are present.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.memory_id.trim().is_empty()
    }
}

impl Config {
    /// Load configuration with layered precedence:
    /// 1. Environment overrides (`MNEMA_<SECTION>_<KEY>`, highest)
    /// 2. Project config: `<repo_root>/.mnema/config.toml`
    /// 3. Global config: `~/.mnema/config.toml`
    /// 4. Built-in defaults (lowest)
    ///
    /// Only fields explicitly set in a higher-priority file override
    /// lower layers.
    pub fn load(repo_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_file(repo_root, None)
    }

    /// Load configuration with an explicit config file path (overrides
    /// both the project and global layers).
    pub fn load_with_file(
        repo_root: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        if let Some(home) = dirs::home_dir() {
            let global_path = home.join(constants::DEFAULT_DATA_DIR).join("config.toml");
            if global_path.exists() {
                let raw = load_toml_value(&global_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(root) = repo_root {
            let project_path = root.join(constants::PROJECT_CONFIG_FILE);
            if project_path.exists() {
                let raw = load_toml_value(&project_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(cf) = config_file {
            if !cf.exists() {
                return Err(ConfigError::NotFound {
                    path: cf.display().to_string(),
                });
            }
            let raw = load_toml_value(cf)?;
            merge_toml_values(&mut merged, &raw);
        }

        let config_str =
            toml::to_string(&merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let mut config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        apply_env_overrides(&mut config);
        config.normalize()?;
        Ok(config)
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.repo.item_folders.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "repo.item_folders".into(),
                reason: "at least one tracked folder is required".into(),
            });
        }
        for folder in &mut self.repo.item_folders {
            if !folder.ends_with('/') {
                tracing::warn!(folder = %folder, "repo.item_folders entry missing trailing slash; appending");
                folder.push('/');
            }
        }
        if !self.repo.doc_extension.starts_with('.') {
            return Err(ConfigError::InvalidValue {
                field: "repo.doc_extension".into(),
                reason: "extension must start with a dot".into(),
            });
        }
        self.storage.data_dir = expand_tilde(&self.storage.data_dir);
        Ok(())
    }

    /// Path of the SQLite state database.
    pub fn state_db_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(constants::STATE_DB_FILE)
    }

    /// Repository root as a path.
    pub fn repo_root(&self) -> PathBuf {
        PathBuf::from(&self.repo.root)
    }
}

/// Load a TOML file as a raw `toml::Value` (preserving only explicitly-set fields).
fn load_toml_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    content
        .parse::<toml::Value>()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Deep-merge `overlay` into `base`. Only keys present in `overlay` are written.
fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    if let (toml::Value::Table(base_map), toml::Value::Table(overlay_map)) = (base, overlay) {
        for (key, overlay_val) in overlay_map {
            if let Some(base_val) = base_map.get_mut(key) {
                if base_val.is_table() && overlay_val.is_table() {
                    merge_toml_values(base_val, overlay_val);
                } else {
                    *base_val = overlay_val.clone();
                }
            } else {
                base_map.insert(key.clone(), overlay_val.clone());
            }
        }
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("MNEMA_REPO_ROOT") {
        config.repo.root = v;
    }
    if let Ok(v) = std::env::var("MNEMA_STORAGE_DATA_DIR") {
        config.storage.data_dir = v;
    }
    if let Ok(v) = std::env::var("MNEMA_MEMORY_ENDPOINT") {
        config.memory.endpoint = v;
    }
    if let Ok(v) = std::env::var("MNEMA_MEMORY_ID") {
        config.memory.memory_id = v;
    }
}

fn expand_tilde(path: &str) -> String {
    if path.starts_with('~')
        && let Some(home) = dirs::home_dir()
    {
        return path.replacen('~', &home.to_string_lossy(), 1);
    }
    path.to_string()
}
