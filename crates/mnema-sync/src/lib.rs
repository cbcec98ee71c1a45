pub mod context;
pub mod engine;
pub mod health;

pub use context::{ContextBackend, ContextResult, ContextRetriever};
pub use engine::{SyncAction, SyncEngine, SyncOptions, SyncResult, plan_actions};
pub use health::{HealthReconciler, HealthReport};

#[cfg(test)]
pub(crate) mod testutil;
