pub mod context;
pub mod delete;
pub mod health;
pub mod item;
pub mod sync;

use anyhow::{Context as _, Result, bail};
use mnema_core::config::Config;
use mnema_memory::MemoryCapability;
use mnema_state::SqliteWatermarkStore;
use mnema_sync::{SyncEngine, SyncResult};
use mnema_vcs::Git2SourceAdapter;
use std::path::Path;

/// Load config for a repository root; the root given on the command
/// line wins over whatever the config file says.
pub(crate) fn load_config(repo_root: &Path, config_file: Option<&Path>) -> Result<Config> {
    let repo_root =
        std::fs::canonicalize(repo_root).context("Failed to resolve repository path")?;
    let mut config = Config::load_with_file(Some(&repo_root), config_file)?;
    config.repo.root = repo_root.to_string_lossy().to_string();
    tracing::debug!(root = %config.repo.root, "config loaded");
    Ok(config)
}

pub(crate) fn build_engine(
    config: &Config,
) -> Result<SyncEngine<Git2SourceAdapter, SqliteWatermarkStore>> {
    let memory = MemoryCapability::from_config(&config.memory)
        .map_err(|e| anyhow::anyhow!("Failed to set up memory client: {}", e))?;
    let watermarks = SqliteWatermarkStore::open(&config.state_db_path())
        .map_err(|e| anyhow::anyhow!("Failed to open state DB: {}", e))?;
    Ok(SyncEngine::new(
        Git2SourceAdapter,
        memory,
        watermarks,
        config.clone(),
    ))
}

/// Print a sync outcome and convert failures into a nonzero exit.
pub(crate) fn finish(result: SyncResult) -> Result<()> {
    finish_with_format(result, false)
}

pub(crate) fn finish_with_format(result: SyncResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if result.success {
            return Ok(());
        }
        bail!(
            "{}",
            result.error.unwrap_or_else(|| "sync failed".to_string())
        )
    }
    if result.success {
        match &result.revision {
            Some(revision) => println!(
                "Synced {} item(s), deleted {} item(s) at revision {}",
                result.items_synced, result.items_deleted, revision
            ),
            None => println!(
                "Synced {} item(s), deleted {} item(s)",
                result.items_synced, result.items_deleted
            ),
        }
        Ok(())
    } else {
        bail!(
            "{}",
            result.error.unwrap_or_else(|| "sync failed".to_string())
        )
    }
}
