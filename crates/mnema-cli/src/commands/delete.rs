use anyhow::Result;
use std::path::Path;

pub fn run(actor: &str, id: &str, config_file: Option<&Path>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = super::load_config(&cwd, config_file)?;
    let engine = super::build_engine(&config)?;
    let result = engine.delete_one(actor, id);
    super::finish(result)
}
