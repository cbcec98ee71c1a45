use mnema_core::config::{Config, RepoConfig};
use mnema_core::extract;
use mnema_core::item;
use mnema_memory::{MemoryCapability, MemoryGateway};
use mnema_state::WatermarkStore;
use mnema_vcs::{DiffEntry, FileChangeKind, SourceAdapter};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

// Stable, internals-free failure descriptions surfaced to callers.
const ERR_SOURCE_HEAD: &str = "failed to resolve source head revision";
const ERR_WATERMARK_READ: &str = "failed to read sync watermark";
const ERR_WATERMARK_RESET: &str = "failed to reset sync watermark";
const ERR_SOURCE_DIFF: &str = "failed to compute source change set";
const ERR_SOURCE_LIST: &str = "failed to enumerate source documents";
const ERR_EXTRACT: &str = "document has no extractable item metadata";
const ERR_MEMORY_UNAVAILABLE: &str = "semantic memory is not configured";
const ERR_MEMORY_WRITE: &str = "failed to store item in memory";
const ERR_MEMORY_DELETE: &str = "failed to mark item for removal";
const ERR_INVALID_ID: &str = "invalid item identifier";

/// Outcome of one sync invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub items_synced: usize,
    pub items_deleted: usize,
    pub revision: Option<String>,
    pub error: Option<String>,
}

impl SyncResult {
    fn ok(items_synced: usize, items_deleted: usize, revision: Option<String>) -> Self {
        Self {
            success: true,
            items_synced,
            items_deleted,
            revision,
            error: None,
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            items_synced: 0,
            items_deleted: 0,
            revision: None,
            error: Some(message.to_string()),
        }
    }
}

/// Options for a delta/bootstrap sync pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Reset the watermark first and rebuild the index from a full
    /// source listing.
    pub force_full: bool,
}

/// Per-path action derived from a source change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Upsert { path: String },
    Delete { path: String },
}

/// Filter a raw diff down to tracked knowledge documents.
///
/// Renames expand into a delete of the old path and an upsert of the
/// new one; each half is kept only if its path is tracked. Placeholder
/// and non-document paths never produce an action, whatever their
/// change kind.
pub fn plan_actions(entries: &[DiffEntry], repo: &RepoConfig) -> Vec<SyncAction> {
    let tracked =
        |path: &str| extract::is_tracked_path(path, &repo.item_folders, &repo.doc_extension);

    let mut actions = Vec::new();
    for entry in entries {
        match &entry.kind {
            FileChangeKind::Added | FileChangeKind::Modified => {
                if tracked(&entry.path) {
                    actions.push(SyncAction::Upsert {
                        path: entry.path.clone(),
                    });
                }
            }
            FileChangeKind::Deleted => {
                if tracked(&entry.path) {
                    actions.push(SyncAction::Delete {
                        path: entry.path.clone(),
                    });
                }
            }
            FileChangeKind::Renamed { old_path } => {
                if tracked(old_path) {
                    actions.push(SyncAction::Delete {
                        path: old_path.clone(),
                    });
                }
                if tracked(&entry.path) {
                    actions.push(SyncAction::Upsert {
                        path: entry.path.clone(),
                    });
                }
            }
        }
    }
    actions
}

/// Synchronizes knowledge items from the source repository into the
/// semantic memory service.
///
/// Three operation modes share the same primitives: single-item sync
/// (per commit, no watermark), delta sync (watermark-driven), and
/// bootstrap/force-full (full listing). Upserts are idempotent and
/// keyed by item id; the watermark only advances after a batch
/// completes, so an aborted pass reprocesses the same delta.
pub struct SyncEngine<S, W> {
    source: S,
    memory: MemoryCapability,
    watermarks: W,
    config: Config,
}

impl<S, W> SyncEngine<S, W>
where
    S: SourceAdapter,
    W: WatermarkStore,
{
    pub fn new(source: S, memory: MemoryCapability, watermarks: W, config: Config) -> Self {
        Self {
            source,
            memory,
            watermarks,
            config,
        }
    }

    fn repo_root(&self) -> PathBuf {
        self.config.repo_root()
    }

    /// Sync one committed document into memory.
    ///
    /// Called per commit with the document content in hand, so neither
    /// the source gateway nor the watermark is touched.
    pub fn sync_one(&self, actor: &str, path: &str, content: &str) -> SyncResult {
        let Some(metadata) = extract::extract_item_metadata(path, content) else {
            warn!(actor, path, "single-item sync: extraction failed");
            return SyncResult::failed(ERR_EXTRACT);
        };

        let Some(gateway) = self.memory.gateway() else {
            warn!(actor, path, "single-item sync: memory unavailable");
            return SyncResult::failed(ERR_MEMORY_UNAVAILABLE);
        };

        match gateway.upsert(actor, &metadata.id, &metadata.to_index_text()) {
            Ok(()) => {
                info!(actor, id = %metadata.id, "item synced to memory");
                SyncResult::ok(1, 0, None)
            }
            Err(err) => {
                warn!(actor, id = %metadata.id, error = %err, "single-item upsert failed");
                SyncResult::failed(ERR_MEMORY_WRITE)
            }
        }
    }

    /// Delta sync: propagate source changes since the actor's watermark.
    ///
    /// With no watermark (first run, or `force_full`) every tracked
    /// document at head is upserted instead. When the watermark already
    /// equals head this is a strict no-op: no diff, no reads, no
    /// writes.
    pub fn sync_all(&self, actor: &str, options: SyncOptions) -> SyncResult {
        let head = match self.source.resolve_head(&self.repo_root()) {
            Ok(head) => head,
            Err(err) => {
                warn!(actor, error = %err, "delta sync: head resolution failed");
                return SyncResult::failed(ERR_SOURCE_HEAD);
            }
        };

        if options.force_full
            && let Err(err) = self.watermarks.clear(actor)
        {
            warn!(actor, error = %err, "delta sync: watermark reset failed");
            return SyncResult::failed(ERR_WATERMARK_RESET);
        }

        let watermark = match self.watermarks.get(actor) {
            Ok(entry) => entry.map(|w| w.revision),
            Err(err) => {
                warn!(actor, error = %err, "delta sync: watermark read failed");
                return SyncResult::failed(ERR_WATERMARK_READ);
            }
        };

        if watermark.as_deref() == Some(head.as_str()) {
            debug!(actor, revision = %head, "index already at head; nothing to sync");
            return SyncResult::ok(0, 0, Some(head));
        }

        let actions = match &watermark {
            Some(from) => {
                let entries = match self.source.diff_commits(&self.repo_root(), from, &head) {
                    Ok(entries) => entries,
                    Err(err) => {
                        warn!(actor, error = %err, "delta sync: diff failed");
                        return SyncResult::failed(ERR_SOURCE_DIFF);
                    }
                };
                plan_actions(&entries, &self.config.repo)
            }
            None => {
                let paths = match self.source.list_files(
                    &self.repo_root(),
                    &self.config.repo.item_folders,
                    &head,
                ) {
                    Ok(paths) => paths,
                    Err(err) => {
                        warn!(actor, error = %err, "bootstrap sync: listing failed");
                        return SyncResult::failed(ERR_SOURCE_LIST);
                    }
                };
                paths
                    .into_iter()
                    .filter(|path| {
                        extract::is_tracked_path(
                            path,
                            &self.config.repo.item_folders,
                            &self.config.repo.doc_extension,
                        )
                    })
                    .map(|path| SyncAction::Upsert { path })
                    .collect()
            }
        };

        let (items_synced, items_deleted) = self.apply_actions(actor, &head, &actions);

        if self.memory.is_available() {
            // Advance only after the batch is done; a failure here just
            // means the next pass reprocesses an already-idempotent delta.
            if let Err(err) = self.watermarks.set(actor, &head) {
                warn!(actor, revision = %head, error = %err, "failed to advance sync watermark");
            }
        } else {
            debug!(actor, "memory unavailable; watermark left unmoved after dry pass");
        }

        info!(
            actor,
            revision = %head,
            items_synced,
            items_deleted,
            changed = actions.len(),
            "sync pass complete"
        );
        SyncResult::ok(items_synced, items_deleted, Some(head))
    }

    /// Best-effort removal of a single item record.
    pub fn delete_one(&self, actor: &str, id: &str) -> SyncResult {
        if !item::is_valid_id(id) {
            return SyncResult::failed(ERR_INVALID_ID);
        }
        let Some(gateway) = self.memory.gateway() else {
            return SyncResult::failed(ERR_MEMORY_UNAVAILABLE);
        };
        match gateway.delete(actor, id) {
            Ok(()) => {
                info!(actor, id, "item marked for removal");
                SyncResult::ok(0, 1, None)
            }
            Err(err) => {
                warn!(actor, id, error = %err, "item removal failed");
                SyncResult::failed(ERR_MEMORY_DELETE)
            }
        }
    }

    /// Apply planned actions; per-item failures reduce counters but
    /// never abort the batch. With memory unavailable this is a dry
    /// pass: the change set is walked but nothing is read or written.
    fn apply_actions(&self, actor: &str, head: &str, actions: &[SyncAction]) -> (usize, usize) {
        let Some(gateway) = self.memory.gateway() else {
            return (0, 0);
        };

        let mut items_synced = 0;
        let mut items_deleted = 0;

        for action in actions {
            match action {
                SyncAction::Delete { path } => {
                    // Deleted files cannot be read, so the id comes from
                    // the path.
                    let Some(id) = extract::item_id_from_path(path) else {
                        warn!(actor, path, "deleted path carries no item id; skipping");
                        continue;
                    };
                    if let Err(err) = gateway.delete(actor, &id) {
                        warn!(actor, id = %id, error = %err, "best-effort delete failed");
                    }
                    items_deleted += 1;
                }
                SyncAction::Upsert { path } => {
                    let content = match self.source.read_file(&self.repo_root(), path, head) {
                        Ok(content) => content,
                        Err(err) => {
                            warn!(actor, path, error = %err, "failed to read changed file; skipping");
                            continue;
                        }
                    };
                    let Some(metadata) = extract::extract_item_metadata(path, &content) else {
                        debug!(actor, path, "changed file is not an item; skipping");
                        continue;
                    };
                    match gateway.upsert(actor, &metadata.id, &metadata.to_index_text()) {
                        Ok(()) => items_synced += 1,
                        Err(err) => {
                            warn!(actor, id = %metadata.id, error = %err, "item upsert failed; skipping");
                        }
                    }
                }
            }
        }

        (items_synced, items_deleted)
    }
}
