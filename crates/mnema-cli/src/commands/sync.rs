use anyhow::Result;
use mnema_sync::SyncOptions;
use std::path::Path;

pub fn run(
    repo_root: &Path,
    actor: &str,
    force: bool,
    json: bool,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(repo_root, config_file)?;
    let engine = super::build_engine(&config)?;
    let result = engine.sync_all(actor, SyncOptions { force_full: force });
    super::finish_with_format(result, json)
}
