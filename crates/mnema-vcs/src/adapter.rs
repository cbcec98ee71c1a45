use crate::diff::DiffEntry;
use mnema_core::error::SourceError;
use std::path::Path;

/// Read-only view of the version-controlled knowledge repository.
///
/// The sync engine consumes this capability and never touches the
/// underlying VCS directly; tests substitute fakes.
pub trait SourceAdapter: Send + Sync {
    /// Resolve the current head revision id.
    fn resolve_head(&self, repo_root: &Path) -> Result<String, SourceError>;

    /// Name-status diff between two revisions.
    fn diff_commits(
        &self,
        repo_root: &Path,
        from_revision: &str,
        to_revision: &str,
    ) -> Result<Vec<DiffEntry>, SourceError>;

    /// File content at a revision.
    fn read_file(
        &self,
        repo_root: &Path,
        path: &str,
        revision: &str,
    ) -> Result<String, SourceError>;

    /// All file paths under the given folder prefixes at a revision.
    fn list_files(
        &self,
        repo_root: &Path,
        prefixes: &[String],
        revision: &str,
    ) -> Result<Vec<String>, SourceError>;
}
