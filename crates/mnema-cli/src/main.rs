mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mnema",
    version,
    about = "Keeps a semantic memory service in sync with a markdown knowledge base",
    long_about = "mnema synchronizes knowledge items (ideas, decisions, projects) from a\n\
        version-controlled markdown repository into a semantic memory service,\n\
        so downstream classifiers can look up related items.\n\n\
        Quick start:\n  \
        mnema sync --actor you\n  \
        mnema health --actor you\n  \
        mnema context --actor you \"kitchen remodel\""
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: .mnema/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delta sync: propagate source changes since the last watermark
    ///
    /// On the first run (or with --force) every tracked document is
    /// synced and the watermark is set to the source head. When the
    /// watermark already matches head, the command is a no-op.
    ///
    /// Examples:
    ///   mnema sync --actor you
    ///   mnema sync --actor you --force
    Sync {
        /// Path to the knowledge repository root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Actor whose namespace and watermark are used
        #[arg(long)]
        actor: String,

        /// Reset the watermark and rebuild from a full source listing
        #[arg(long)]
        force: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync a single committed document
    ///
    /// Reads the document content from --file (or stdin) and upserts
    /// its metadata record. Meant to be wired to a post-commit hook;
    /// does not touch the delta-sync watermark.
    ///
    /// Example: mnema item --actor you 10-ideas/2025-01-20__t__sb-1234567.md --file /tmp/doc.md
    Item {
        /// Repository-relative path of the committed document
        item_path: String,

        /// Actor whose namespace is written
        #[arg(long)]
        actor: String,

        /// File to read the document content from (default: stdin)
        #[arg(long)]
        file: Option<String>,
    },
    /// Best-effort removal of one item record from memory
    ///
    /// Example: mnema delete --actor you sb-1234567
    Delete {
        /// Stable item identifier (sb- + 7 hex digits)
        id: String,

        /// Actor whose namespace is written
        #[arg(long)]
        actor: String,
    },
    /// Compare source and memory and report drift
    ///
    /// Enumerates both stores independently, diffs them by item id,
    /// and prints counts plus up to ten discrepancies per direction.
    /// Read-only: never mutates either store.
    ///
    /// Example: mnema health --actor you
    Health {
        /// Path to the knowledge repository root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Actor whose namespace is compared
        #[arg(long)]
        actor: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Retrieve item context for a query (memory-first, source fallback)
    ///
    /// Examples:
    ///   mnema context --actor you "kitchen remodel"
    ///   mnema context --actor you "budget" --limit 5
    Context {
        /// Query text
        query: String,

        /// Path to the knowledge repository root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Actor whose namespace is queried
        #[arg(long)]
        actor: String,

        /// Maximum number of items to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_file = cli.config.as_deref().map(std::path::Path::new);

    match cli.command {
        Commands::Sync {
            path,
            actor,
            force,
            json,
        } => {
            let path = resolve_path(path)?;
            commands::sync::run(&path, &actor, force, json, config_file)?;
        }
        Commands::Item {
            item_path,
            actor,
            file,
        } => {
            commands::item::run(&actor, &item_path, file.as_deref(), config_file)?;
        }
        Commands::Delete { id, actor } => {
            commands::delete::run(&actor, &id, config_file)?;
        }
        Commands::Health { path, actor, json } => {
            let path = resolve_path(path)?;
            commands::health::run(&path, &actor, json, config_file)?;
        }
        Commands::Context {
            query,
            path,
            actor,
            limit,
        } => {
            let path = resolve_path(path)?;
            commands::context::run(&path, &actor, &query, limit, config_file)?;
        }
    }

    Ok(())
}

fn resolve_path(path: Option<String>) -> anyhow::Result<std::path::PathBuf> {
    match path {
        Some(p) => Ok(std::path::PathBuf::from(p)),
        None => std::env::current_dir().map_err(Into::into),
    }
}
