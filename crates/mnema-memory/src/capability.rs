use crate::client::HttpMemoryClient;
use mnema_core::config::MemoryConfig;
use mnema_core::error::MemoryError;
use tracing::info;

/// Write/read view of the semantic memory service.
///
/// Records are plain text blobs scoped to a per-actor namespace and
/// keyed by a caller-supplied idempotency key, so repeated upserts of
/// the same record are safe.
pub trait MemoryGateway: Send + Sync {
    /// Idempotent record upsert.
    fn upsert(&self, actor: &str, key: &str, text: &str) -> Result<(), MemoryError>;

    /// Best-effort delete; absence of the record is not an error.
    fn delete(&self, actor: &str, key: &str) -> Result<(), MemoryError>;

    /// Enumerate records in the actor's namespace.
    fn list(&self, actor: &str, limit: usize) -> Result<Vec<String>, MemoryError>;

    /// Semantic query over the actor's namespace.
    fn search(&self, actor: &str, query: &str, limit: usize) -> Result<Vec<String>, MemoryError>;
}

/// The memory capability is optional deployment-wise: when the service
/// is not configured, sync degrades to dry passes instead of failing.
/// Callers branch on availability once, here, rather than on a nullable
/// client at every call site.
pub enum MemoryCapability {
    Available(Box<dyn MemoryGateway>),
    Unavailable,
}

impl MemoryCapability {
    /// Build the capability from config: an HTTP client when the
    /// service is configured, `Unavailable` otherwise.
    pub fn from_config(config: &MemoryConfig) -> Result<Self, MemoryError> {
        if !config.is_configured() {
            info!("memory service not configured; running without an index");
            return Ok(Self::Unavailable);
        }
        let client = HttpMemoryClient::new(config)?;
        Ok(Self::Available(Box::new(client)))
    }

    /// Wrap an existing gateway (used by tests and embedders).
    pub fn available(gateway: Box<dyn MemoryGateway>) -> Self {
        Self::Available(gateway)
    }

    pub fn gateway(&self) -> Option<&dyn MemoryGateway> {
        match self {
            Self::Available(gateway) => Some(gateway.as_ref()),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}
