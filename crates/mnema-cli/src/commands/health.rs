use anyhow::Result;
use mnema_memory::MemoryCapability;
use mnema_state::SqliteWatermarkStore;
use mnema_sync::HealthReconciler;
use mnema_vcs::Git2SourceAdapter;
use std::path::Path;

pub fn run(repo_root: &Path, actor: &str, json: bool, config_file: Option<&Path>) -> Result<()> {
    let config = super::load_config(repo_root, config_file)?;
    let memory = MemoryCapability::from_config(&config.memory)
        .map_err(|e| anyhow::anyhow!("Failed to set up memory client: {}", e))?;
    let watermarks = SqliteWatermarkStore::open(&config.state_db_path())
        .map_err(|e| anyhow::anyhow!("Failed to open state DB: {}", e))?;

    let report =
        HealthReconciler::new(&Git2SourceAdapter, &memory, &watermarks, &config).check(actor);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Source items: {}", report.source_count);
    println!("Memory items: {}", report.memory_count);
    println!(
        "In sync:      {}",
        if report.in_sync { "yes" } else { "no" }
    );
    match (&report.last_sync_revision, &report.last_sync_at) {
        (Some(revision), Some(at)) => println!("Last sync:    {revision} ({at})"),
        (Some(revision), None) => println!("Last sync:    {revision}"),
        _ => println!("Last sync:    never"),
    }
    if !report.missing_in_memory.is_empty() {
        println!("Missing in memory: {}", report.missing_in_memory.join(", "));
    }
    if !report.extra_in_memory.is_empty() {
        println!("Extra in memory:   {}", report.extra_in_memory.join(", "));
    }

    Ok(())
}
