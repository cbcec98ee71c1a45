use mnema_core::config::Config;
use mnema_core::constants::HEALTH_DIFF_DISPLAY_CAP;
use mnema_core::extract;
use mnema_core::item::ItemMetadata;
use mnema_memory::MemoryCapability;
use mnema_state::WatermarkStore;
use mnema_vcs::SourceAdapter;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Outcome of one reconciliation pass. Computed fresh on every call,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub source_count: usize,
    pub memory_count: usize,
    pub in_sync: bool,
    pub last_sync_revision: Option<String>,
    pub last_sync_at: Option<String>,
    /// Item ids present in the source but absent from memory
    /// (displayed list capped; `in_sync` uses the full sets).
    pub missing_in_memory: Vec<String>,
    /// Item ids present in memory but absent from the source (same cap).
    pub extra_in_memory: Vec<String>,
}

impl HealthReport {
    /// Report shape used when either enumeration fails outright.
    fn degraded() -> Self {
        Self {
            source_count: 0,
            memory_count: 0,
            in_sync: false,
            last_sync_revision: None,
            last_sync_at: None,
            missing_in_memory: Vec::new(),
            extra_in_memory: Vec::new(),
        }
    }
}

/// Full-scan comparator between the source repository and the memory
/// namespace. Read-only by contract: it never mutates either store and
/// never raises to the caller.
pub struct HealthReconciler<'a, S, W> {
    source: &'a S,
    memory: &'a MemoryCapability,
    watermarks: &'a W,
    config: &'a Config,
}

impl<'a, S, W> HealthReconciler<'a, S, W>
where
    S: SourceAdapter,
    W: WatermarkStore,
{
    pub fn new(
        source: &'a S,
        memory: &'a MemoryCapability,
        watermarks: &'a W,
        config: &'a Config,
    ) -> Self {
        Self {
            source,
            memory,
            watermarks,
            config,
        }
    }

    pub fn check(&self, actor: &str) -> HealthReport {
        let source_items = match self.enumerate_source() {
            Ok(items) => items,
            Err(()) => return HealthReport::degraded(),
        };
        let memory_items = match self.enumerate_memory(actor) {
            Ok(items) => items,
            Err(()) => return HealthReport::degraded(),
        };

        let source_ids: BTreeSet<String> =
            source_items.iter().map(|item| item.id.clone()).collect();
        let memory_ids: BTreeSet<String> =
            memory_items.iter().map(|item| item.id.clone()).collect();

        let mut missing_in_memory: Vec<String> =
            source_ids.difference(&memory_ids).cloned().collect();
        let mut extra_in_memory: Vec<String> =
            memory_ids.difference(&source_ids).cloned().collect();

        // Count equality alone is not enough: two disjoint sets of the
        // same size must still report out-of-sync.
        let in_sync = missing_in_memory.is_empty() && extra_in_memory.is_empty();
        missing_in_memory.truncate(HEALTH_DIFF_DISPLAY_CAP);
        extra_in_memory.truncate(HEALTH_DIFF_DISPLAY_CAP);

        let (last_sync_revision, last_sync_at) = match self.watermarks.get(actor) {
            Ok(Some(watermark)) => (Some(watermark.revision), Some(watermark.updated_at)),
            Ok(None) => (None, None),
            Err(err) => {
                warn!(actor, error = %err, "health check: watermark lookup failed");
                (None, None)
            }
        };

        HealthReport {
            source_count: source_items.len(),
            memory_count: memory_items.len(),
            in_sync,
            last_sync_revision,
            last_sync_at,
            missing_in_memory,
            extra_in_memory,
        }
    }

    fn enumerate_source(&self) -> Result<Vec<ItemMetadata>, ()> {
        let root = self.config.repo_root();
        let head = self.source.resolve_head(&root).map_err(|err| {
            warn!(error = %err, "health check: head resolution failed");
        })?;
        let paths = self
            .source
            .list_files(&root, &self.config.repo.item_folders, &head)
            .map_err(|err| {
                warn!(error = %err, "health check: source listing failed");
            })?;

        let mut items = Vec::new();
        for path in paths {
            if !extract::is_tracked_path(
                &path,
                &self.config.repo.item_folders,
                &self.config.repo.doc_extension,
            ) {
                continue;
            }
            let content = self.source.read_file(&root, &path, &head).map_err(|err| {
                warn!(path, error = %err, "health check: source read failed");
            })?;
            if let Some(item) = extract::extract_item_metadata(&path, &content) {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn enumerate_memory(&self, actor: &str) -> Result<Vec<ItemMetadata>, ()> {
        let Some(gateway) = self.memory.gateway() else {
            warn!(actor, "health check: memory unavailable");
            return Err(());
        };
        let blobs = gateway
            .list(actor, self.config.memory.list_limit)
            .map_err(|err| {
                warn!(actor, error = %err, "health check: memory listing failed");
            })?;
        // Non-item blobs (legacy marker records, unrelated text) are
        // skipped, not errors.
        Ok(blobs
            .iter()
            .filter_map(|blob| ItemMetadata::from_index_text(blob))
            .collect())
    }
}
