//! Shared fakes for engine/health/context tests. Each fake exposes an
//! `Arc` state handle so assertions survive moving the fake into an
//! engine.

use mnema_core::config::Config;
use mnema_core::error::{MemoryError, SourceError, StateError};
use mnema_memory::MemoryGateway;
use mnema_state::{Watermark, WatermarkStore};
use mnema_vcs::{DiffEntry, SourceAdapter};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub fn test_config() -> Config {
    Config::default()
}

#[derive(Default)]
pub struct SourceCounters {
    diff: AtomicUsize,
    read: AtomicUsize,
    list: AtomicUsize,
}

impl SourceCounters {
    pub fn diff_calls(&self) -> usize {
        self.diff.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list.load(Ordering::SeqCst)
    }
}

/// Scriptable in-memory source: fixed head, diff, listing, and file
/// contents, with call counters for the no-op invariant tests.
pub struct FakeSource {
    head: Option<String>,
    diff: Vec<DiffEntry>,
    listing: Vec<String>,
    files: BTreeMap<String, String>,
    counters: Arc<SourceCounters>,
}

impl FakeSource {
    pub fn with_head(head: &str) -> Self {
        Self {
            head: Some(head.to_string()),
            diff: Vec::new(),
            listing: Vec::new(),
            files: BTreeMap::new(),
            counters: Arc::new(SourceCounters::default()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            head: None,
            diff: Vec::new(),
            listing: Vec::new(),
            files: BTreeMap::new(),
            counters: Arc::new(SourceCounters::default()),
        }
    }

    pub fn with_diff(mut self, diff: Vec<DiffEntry>) -> Self {
        self.diff = diff;
        self
    }

    pub fn with_listing(mut self, listing: Vec<&str>) -> Self {
        self.listing = listing.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_listing_entry(mut self, path: &str) -> Self {
        self.listing.push(path.to_string());
        self
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn counters(&self) -> Arc<SourceCounters> {
        Arc::clone(&self.counters)
    }
}

impl SourceAdapter for FakeSource {
    fn resolve_head(&self, _repo_root: &Path) -> Result<String, SourceError> {
        self.head
            .clone()
            .ok_or_else(|| SourceError::Git("fake source offline".to_string()))
    }

    fn diff_commits(
        &self,
        _repo_root: &Path,
        _from_revision: &str,
        _to_revision: &str,
    ) -> Result<Vec<DiffEntry>, SourceError> {
        self.counters.diff.fetch_add(1, Ordering::SeqCst);
        Ok(self.diff.clone())
    }

    fn read_file(
        &self,
        _repo_root: &Path,
        path: &str,
        revision: &str,
    ) -> Result<String, SourceError> {
        self.counters.read.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::FileNotFound {
                path: path.to_string(),
                revision: revision.to_string(),
            })
    }

    fn list_files(
        &self,
        _repo_root: &Path,
        prefixes: &[String],
        _revision: &str,
    ) -> Result<Vec<String>, SourceError> {
        self.counters.list.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .listing
            .iter()
            .filter(|path| prefixes.iter().any(|p| path.starts_with(p.as_str())))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryState {
    records: Mutex<BTreeMap<(String, String), String>>,
    deleted: Mutex<Vec<String>>,
    search_results: Mutex<Option<Vec<String>>>,
    list_override: Mutex<Option<Vec<String>>>,
    fail_upsert_key: Mutex<Option<String>>,
    fail_lists: AtomicBool,
    fail_searches: AtomicBool,
    upsert_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryState {
    pub fn record(&self, actor: &str, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(&(actor.to_string(), key.to_string()))
            .cloned()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn fail_upserts_for(&self, key: &str) {
        *self.fail_upsert_key.lock().unwrap() = Some(key.to_string());
    }

    pub fn set_search_results(&self, blobs: Vec<String>) {
        *self.search_results.lock().unwrap() = Some(blobs);
    }

    pub fn set_list_override(&self, blobs: Vec<String>) {
        *self.list_override.lock().unwrap() = Some(blobs);
    }

    pub fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    pub fn fail_searches(&self) {
        self.fail_searches.store(true, Ordering::SeqCst);
    }
}

/// In-memory gateway recording upserts and deletes per actor.
#[derive(Default)]
pub struct FakeMemory {
    state: Arc<MemoryState>,
}

impl FakeMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<MemoryState> {
        Arc::clone(&self.state)
    }
}

impl MemoryGateway for FakeMemory {
    fn upsert(&self, actor: &str, key: &str, text: &str) -> Result<(), MemoryError> {
        self.state.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .state
            .fail_upsert_key
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|k| k == key)
        {
            return Err(MemoryError::Status { status: 503 });
        }
        self.state
            .records
            .lock()
            .unwrap()
            .insert((actor.to_string(), key.to_string()), text.to_string());
        Ok(())
    }

    fn delete(&self, actor: &str, key: &str) -> Result<(), MemoryError> {
        self.state.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .records
            .lock()
            .unwrap()
            .remove(&(actor.to_string(), key.to_string()));
        self.state.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn list(&self, actor: &str, _limit: usize) -> Result<Vec<String>, MemoryError> {
        if self.state.fail_lists.load(Ordering::SeqCst) {
            return Err(MemoryError::Status { status: 500 });
        }
        if let Some(blobs) = self.state.list_override.lock().unwrap().clone() {
            return Ok(blobs);
        }
        Ok(self
            .state
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.0 == actor)
            .map(|(_, text)| text.clone())
            .collect())
    }

    fn search(&self, actor: &str, _query: &str, limit: usize) -> Result<Vec<String>, MemoryError> {
        if self.state.fail_searches.load(Ordering::SeqCst) {
            return Err(MemoryError::Status { status: 500 });
        }
        if let Some(blobs) = self.state.search_results.lock().unwrap().clone() {
            return Ok(blobs);
        }
        self.list(actor, limit)
    }
}

#[derive(Default)]
pub struct WatermarkState {
    revisions: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl WatermarkState {
    pub fn revision(&self, actor: &str) -> Option<String> {
        self.revisions.lock().unwrap().get(actor).cloned()
    }
}

/// In-memory watermark store with failure switches.
#[derive(Default)]
pub struct FakeWatermarks {
    state: Arc<WatermarkState>,
}

impl FakeWatermarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, actor: &str, revision: &str) {
        self.state
            .revisions
            .lock()
            .unwrap()
            .insert(actor.to_string(), revision.to_string());
    }

    pub fn fail_reads(&self) {
        self.state.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.state.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> Arc<WatermarkState> {
        Arc::clone(&self.state)
    }
}

impl WatermarkStore for FakeWatermarks {
    fn get(&self, actor: &str) -> Result<Option<Watermark>, StateError> {
        if self.state.fail_reads.load(Ordering::SeqCst) {
            return Err(StateError::Sqlite("fake watermark store offline".into()));
        }
        Ok(self
            .state
            .revisions
            .lock()
            .unwrap()
            .get(actor)
            .map(|revision| Watermark {
                actor: actor.to_string(),
                revision: revision.clone(),
                updated_at: "2025-01-01T00:00:00Z".to_string(),
            }))
    }

    fn set(&self, actor: &str, revision: &str) -> Result<(), StateError> {
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(StateError::Sqlite("fake watermark store offline".into()));
        }
        self.state
            .revisions
            .lock()
            .unwrap()
            .insert(actor.to_string(), revision.to_string());
        Ok(())
    }

    fn clear(&self, actor: &str) -> Result<(), StateError> {
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(StateError::Sqlite("fake watermark store offline".into()));
        }
        self.state.revisions.lock().unwrap().remove(actor);
        Ok(())
    }
}
