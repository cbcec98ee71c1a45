use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config value: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("not a git repository: {path}")]
    NotGitRepo { path: String },

    #[error("git error: {0}")]
    Git(String),

    #[error("file not found at revision: {path}@{revision}")]
    FileNotFound { path: String, revision: String },
}

impl SourceError {
    /// Convenience constructor for git errors — use with `.map_err(SourceError::git)`.
    pub fn git<E: std::fmt::Display>(e: E) -> Self {
        Self::Git(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StateError {
    /// Convenience constructor for SQLite errors — use with `.map_err(StateError::sqlite)`.
    pub fn sqlite<E: std::fmt::Display>(e: E) -> Self {
        Self::Sqlite(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("memory service not configured")]
    NotConfigured,

    #[error("memory api key not set")]
    MissingApiKey,

    #[error("memory transport error: {0}")]
    Transport(String),

    #[error("memory service returned status {status}")]
    Status { status: u16 },
}

impl MemoryError {
    /// Convenience constructor for transport errors — use with `.map_err(MemoryError::transport)`.
    pub fn transport<E: std::fmt::Display>(e: E) -> Self {
        Self::Transport(e.to_string())
    }
}
