use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

pub fn run(
    actor: &str,
    item_path: &str,
    file: Option<&str>,
    config_file: Option<&Path>,
) -> Result<()> {
    let content = match file {
        Some(file) => {
            std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read document from stdin")?;
            buf
        }
    };

    let cwd = std::env::current_dir()?;
    let config = super::load_config(&cwd, config_file)?;
    let engine = super::build_engine(&config)?;
    let result = engine.sync_one(actor, item_path, &content);
    super::finish(result)
}
