use anyhow::Result;
use mnema_memory::MemoryCapability;
use mnema_sync::{ContextBackend, ContextRetriever};
use mnema_vcs::Git2SourceAdapter;
use std::path::Path;

pub fn run(
    repo_root: &Path,
    actor: &str,
    query: &str,
    limit: usize,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(repo_root, config_file)?;
    let memory = MemoryCapability::from_config(&config.memory)
        .map_err(|e| anyhow::anyhow!("Failed to set up memory client: {}", e))?;

    let result =
        ContextRetriever::new(&Git2SourceAdapter, &memory, &config).retrieve(actor, query, limit);

    let backend = match result.backend {
        ContextBackend::Memory => "memory",
        ContextBackend::Source => "source",
        ContextBackend::Unavailable => "unavailable",
    };
    println!("Backend: {backend}");
    println!("Items:   {}", result.items.len());

    if result.items.is_empty() {
        return Ok(());
    }

    println!();
    println!("{:<12} {:<10} {:<12} TITLE", "ID", "TYPE", "STATUS");
    println!("{}", "-".repeat(60));
    for item in &result.items {
        println!(
            "{:<12} {:<10} {:<12} {}",
            item.id,
            item.item_type.as_str(),
            item.status.map(|s| s.as_str()).unwrap_or("-"),
            item.title,
        );
    }

    Ok(())
}
