use mnema_core::config::Config;
use mnema_core::extract;
use mnema_core::item::ItemMetadata;
use mnema_memory::MemoryCapability;
use mnema_vcs::SourceAdapter;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Which backend served a context request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextBackend {
    Memory,
    Source,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextResult {
    pub items: Vec<ItemMetadata>,
    pub backend: ContextBackend,
}

/// Item context for the downstream classifier.
///
/// Memory-first with fallback: the semantic memory service is queried
/// first; when it is unavailable, errors, or returns nothing, the
/// source repository is scanned at head instead. Never errors — the
/// worst case is an empty list.
pub struct ContextRetriever<'a, S> {
    source: &'a S,
    memory: &'a MemoryCapability,
    config: &'a Config,
}

impl<'a, S> ContextRetriever<'a, S>
where
    S: SourceAdapter,
{
    pub fn new(source: &'a S, memory: &'a MemoryCapability, config: &'a Config) -> Self {
        Self {
            source,
            memory,
            config,
        }
    }

    pub fn retrieve(&self, actor: &str, query: &str, limit: usize) -> ContextResult {
        if let Some(gateway) = self.memory.gateway() {
            match gateway.search(actor, query, limit) {
                Ok(blobs) => {
                    let items: Vec<ItemMetadata> = blobs
                        .iter()
                        .filter_map(|blob| ItemMetadata::from_index_text(blob))
                        .take(limit)
                        .collect();
                    if !items.is_empty() {
                        info!(
                            actor,
                            count = items.len(),
                            backend = "memory",
                            "item context served"
                        );
                        return ContextResult {
                            items,
                            backend: ContextBackend::Memory,
                        };
                    }
                    debug!(actor, "memory returned no items; falling back to source scan");
                }
                Err(err) => {
                    warn!(actor, error = %err, "memory context retrieval failed; falling back to source scan");
                }
            }
        }

        match self.scan_source(limit) {
            Ok(items) => {
                info!(
                    actor,
                    count = items.len(),
                    backend = "source",
                    "item context served"
                );
                ContextResult {
                    items,
                    backend: ContextBackend::Source,
                }
            }
            Err(()) => {
                warn!(actor, "item context unavailable from both backends");
                ContextResult {
                    items: Vec::new(),
                    backend: ContextBackend::Unavailable,
                }
            }
        }
    }

    fn scan_source(&self, limit: usize) -> Result<Vec<ItemMetadata>, ()> {
        let root = self.config.repo_root();
        let head = self.source.resolve_head(&root).map_err(|err| {
            warn!(error = %err, "context fallback: head resolution failed");
        })?;
        let paths = self
            .source
            .list_files(&root, &self.config.repo.item_folders, &head)
            .map_err(|err| {
                warn!(error = %err, "context fallback: source listing failed");
            })?;

        let mut items = Vec::new();
        for path in paths {
            if items.len() >= limit {
                break;
            }
            if !extract::is_tracked_path(
                &path,
                &self.config.repo.item_folders,
                &self.config.repo.doc_extension,
            ) {
                continue;
            }
            // Per-file failures degrade the context, they don't kill it.
            let content = match self.source.read_file(&root, &path, &head) {
                Ok(content) => content,
                Err(err) => {
                    warn!(path, error = %err, "context fallback: source read failed; skipping");
                    continue;
                }
            };
            if let Some(item) = extract::extract_item_metadata(&path, &content) {
                items.push(item);
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeMemory, FakeSource, test_config};
    use mnema_core::item::ItemType;
    use mnema_memory::MemoryGateway;

    fn item(id: &str) -> ItemMetadata {
        ItemMetadata {
            id: id.to_string(),
            title: "Title".to_string(),
            item_type: ItemType::Idea,
            path: format!("10-ideas/{id}.md"),
            tags: Vec::new(),
            status: None,
        }
    }

    fn source_with_item(id: &str) -> FakeSource {
        let path = format!("10-ideas/{id}.md");
        FakeSource::with_head("head-1")
            .with_listing_entry(&path)
            .with_file(
                &path,
                &format!("---\nid: {id}\ntitle: Title\ntype: idea\n---\n"),
            )
    }

    #[test]
    fn memory_hit_serves_without_touching_the_source() {
        let config = test_config();
        let source = FakeSource::with_head("head-1");
        let counters = source.counters();
        let memory = FakeMemory::new();
        memory
            .upsert("user-1", "sb-0000001", &item("sb-0000001").to_index_text())
            .unwrap();
        let capability = MemoryCapability::available(Box::new(memory));

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 10);

        assert_eq!(result.backend, ContextBackend::Memory);
        assert_eq!(result.items, vec![item("sb-0000001")]);
        assert_eq!(counters.list_calls(), 0);
        assert_eq!(counters.read_calls(), 0);
    }

    #[test]
    fn empty_memory_falls_back_to_source_scan() {
        let config = test_config();
        let source = source_with_item("sb-0000002");
        let capability = MemoryCapability::available(Box::new(FakeMemory::new()));

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 10);

        assert_eq!(result.backend, ContextBackend::Source);
        assert_eq!(result.items, vec![item("sb-0000002")]);
    }

    #[test]
    fn memory_error_falls_back_to_source_scan() {
        let config = test_config();
        let source = source_with_item("sb-0000003");
        let memory = FakeMemory::new();
        memory.state().fail_searches();
        let capability = MemoryCapability::available(Box::new(memory));

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 10);

        assert_eq!(result.backend, ContextBackend::Source);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn non_item_search_results_are_ignored_and_trigger_fallback() {
        let config = test_config();
        let source = source_with_item("sb-0000005");
        let memory = FakeMemory::new();
        memory
            .state()
            .set_search_results(vec!["Last synced commit: abc123".to_string()]);
        let capability = MemoryCapability::available(Box::new(memory));

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 10);

        assert_eq!(result.backend, ContextBackend::Source);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn unconfigured_memory_goes_straight_to_the_source() {
        let config = test_config();
        let source = source_with_item("sb-0000004");
        let capability = MemoryCapability::Unavailable;

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 10);

        assert_eq!(result.backend, ContextBackend::Source);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn both_backends_failing_yields_empty_unavailable_result() {
        let config = test_config();
        let source = FakeSource::unavailable();
        let memory = FakeMemory::new();
        memory.state().fail_searches();
        let capability = MemoryCapability::available(Box::new(memory));

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 10);

        assert_eq!(result.backend, ContextBackend::Unavailable);
        assert!(result.items.is_empty());
    }

    #[test]
    fn result_limit_is_respected_on_the_fallback_path() {
        let config = test_config();
        let mut source = FakeSource::with_head("head-1");
        for i in 0..5 {
            let id = format!("sb-{i:07x}");
            let path = format!("10-ideas/{id}.md");
            source = source.with_listing_entry(&path).with_file(
                &path,
                &format!("---\nid: {id}\ntitle: Title\ntype: idea\n---\n"),
            );
        }
        let capability = MemoryCapability::Unavailable;

        let result =
            ContextRetriever::new(&source, &capability, &config).retrieve("user-1", "ideas", 3);

        assert_eq!(result.items.len(), 3);
    }
}
