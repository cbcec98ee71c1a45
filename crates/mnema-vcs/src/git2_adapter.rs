use crate::adapter::SourceAdapter;
use crate::diff::DiffEntry;
use git2::{DiffFindOptions, DiffOptions, ObjectType, Oid, Repository, Tree, TreeWalkMode, TreeWalkResult};
use mnema_core::error::SourceError;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct Git2SourceAdapter;

impl Git2SourceAdapter {
    fn open_repo(repo_root: &Path) -> Result<Repository, SourceError> {
        Repository::open(repo_root).map_err(|_| SourceError::NotGitRepo {
            path: repo_root.display().to_string(),
        })
    }

    fn rev_to_oid(repo: &Repository, rev: &str) -> Result<Oid, SourceError> {
        repo.revparse_single(rev)
            .map(|obj| obj.id())
            .map_err(|e| SourceError::Git(format!("failed to resolve revision `{rev}`: {e}")))
    }

    fn tree_at<'repo>(repo: &'repo Repository, rev: &str) -> Result<Tree<'repo>, SourceError> {
        let obj = repo
            .revparse_single(rev)
            .map_err(|e| SourceError::Git(format!("failed to resolve revision `{rev}`: {e}")))?;
        let commit = obj
            .peel_to_commit()
            .map_err(|e| SourceError::Git(format!("failed to peel revision `{rev}`: {e}")))?;
        commit
            .tree()
            .map_err(|e| SourceError::Git(format!("failed to load tree at `{rev}`: {e}")))
    }
}

impl SourceAdapter for Git2SourceAdapter {
    fn resolve_head(&self, repo_root: &Path) -> Result<String, SourceError> {
        let repo = Self::open_repo(repo_root)?;
        let head = repo
            .head()
            .map_err(|e| SourceError::Git(format!("failed to read HEAD: {e}")))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| SourceError::Git(format!("failed to resolve HEAD commit: {e}")))?;
        Ok(commit.id().to_string())
    }

    fn diff_commits(
        &self,
        repo_root: &Path,
        from_revision: &str,
        to_revision: &str,
    ) -> Result<Vec<DiffEntry>, SourceError> {
        let repo = Self::open_repo(repo_root)?;
        let from_tree = Self::tree_at(&repo, from_revision)?;
        let to_tree = Self::tree_at(&repo, to_revision)?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_typechange(true).include_untracked(false);
        let mut diff = repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut diff_opts))
            .map_err(|e| SourceError::Git(format!("failed to compute diff: {e}")))?;
        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))
            .map_err(|e| SourceError::Git(format!("failed to detect renames: {e}")))?;

        let mut out = Vec::new();
        for delta in diff.deltas() {
            let old_path = delta
                .old_file()
                .path()
                .map(|p| p.to_string_lossy().to_string());
            let new_path = delta
                .new_file()
                .path()
                .map(|p| p.to_string_lossy().to_string());

            match delta.status() {
                git2::Delta::Added => {
                    if let Some(path) = new_path {
                        out.push(DiffEntry::added(path));
                    }
                }
                git2::Delta::Deleted => {
                    if let Some(path) = old_path {
                        out.push(DiffEntry::deleted(path));
                    }
                }
                git2::Delta::Renamed => {
                    if let (Some(old_path), Some(new_path)) = (old_path, new_path) {
                        out.push(DiffEntry::renamed(old_path, new_path));
                    }
                }
                _ => {
                    if let Some(path) = new_path.or(old_path) {
                        out.push(DiffEntry::modified(path));
                    }
                }
            }
        }
        debug!(from = from_revision, to = to_revision, entries = out.len(), "computed name-status diff");
        Ok(out)
    }

    fn read_file(
        &self,
        repo_root: &Path,
        path: &str,
        revision: &str,
    ) -> Result<String, SourceError> {
        let repo = Self::open_repo(repo_root)?;
        let tree = Self::tree_at(&repo, revision)?;
        let entry = tree
            .get_path(Path::new(path))
            .map_err(|_| SourceError::FileNotFound {
                path: path.to_string(),
                revision: revision.to_string(),
            })?;
        let blob = repo
            .find_blob(entry.id())
            .map_err(|e| SourceError::Git(format!("failed to read blob for `{path}`: {e}")))?;
        String::from_utf8(blob.content().to_vec())
            .map_err(|_| SourceError::Git(format!("file `{path}` is not valid utf-8")))
    }

    fn list_files(
        &self,
        repo_root: &Path,
        prefixes: &[String],
        revision: &str,
    ) -> Result<Vec<String>, SourceError> {
        let repo = Self::open_repo(repo_root)?;
        let tree = Self::tree_at(&repo, revision)?;

        let mut paths = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                let path = format!("{root}{name}");
                if prefixes.iter().any(|p| path.starts_with(p.as_str())) {
                    paths.push(path);
                }
            }
            TreeWalkResult::Ok
        })
        .map_err(|e| SourceError::Git(format!("failed to walk tree at `{revision}`: {e}")))?;

        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::FileChangeKind;

    fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
        let workdir = repo.workdir().unwrap();
        let mut index = repo.index().unwrap();
        for (path, content) in files {
            let full = workdir.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&full, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn remove_and_commit(repo: &Repository, path: &str, message: &str) -> Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::remove_file(workdir.join(path)).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new(path)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    }

    #[test]
    fn resolve_head_returns_full_commit_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let oid = commit_files(&repo, &[("10-ideas/a.md", "alpha\n")], "initial");

        let adapter = Git2SourceAdapter;
        assert_eq!(adapter.resolve_head(dir.path()).unwrap(), oid.to_string());
    }

    #[test]
    fn resolve_head_fails_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = Git2SourceAdapter;
        assert!(matches!(
            adapter.resolve_head(dir.path()),
            Err(SourceError::NotGitRepo { .. })
        ));
    }

    #[test]
    fn diff_commits_reports_added_modified_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit_files(
            &repo,
            &[("10-ideas/a.md", "alpha\n"), ("10-ideas/b.md", "beta\n")],
            "initial",
        );
        commit_files(
            &repo,
            &[("10-ideas/a.md", "alpha v2\n"), ("10-ideas/c.md", "gamma\n")],
            "second",
        );
        let third = remove_and_commit(&repo, "10-ideas/b.md", "remove b");

        let adapter = Git2SourceAdapter;
        let diff = adapter
            .diff_commits(dir.path(), &first.to_string(), &third.to_string())
            .unwrap();

        let find = |path: &str| diff.iter().find(|d| d.path == path).map(|d| d.kind.clone());
        assert_eq!(find("10-ideas/a.md"), Some(FileChangeKind::Modified));
        assert_eq!(find("10-ideas/c.md"), Some(FileChangeKind::Added));
        assert_eq!(find("10-ideas/b.md"), Some(FileChangeKind::Deleted));
    }

    #[test]
    fn read_file_returns_content_at_older_revision() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit_files(&repo, &[("10-ideas/a.md", "original\n")], "initial");
        commit_files(&repo, &[("10-ideas/a.md", "rewritten\n")], "second");

        let adapter = Git2SourceAdapter;
        let old = adapter
            .read_file(dir.path(), "10-ideas/a.md", &first.to_string())
            .unwrap();
        assert_eq!(old, "original\n");

        let head = adapter.resolve_head(dir.path()).unwrap();
        let new = adapter
            .read_file(dir.path(), "10-ideas/a.md", &head)
            .unwrap();
        assert_eq!(new, "rewritten\n");
    }

    #[test]
    fn read_file_missing_path_reports_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let oid = commit_files(&repo, &[("10-ideas/a.md", "alpha\n")], "initial");

        let adapter = Git2SourceAdapter;
        assert!(matches!(
            adapter.read_file(dir.path(), "10-ideas/missing.md", &oid.to_string()),
            Err(SourceError::FileNotFound { .. })
        ));
    }

    #[test]
    fn list_files_filters_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let oid = commit_files(
            &repo,
            &[
                ("10-ideas/a.md", "alpha\n"),
                ("30-projects/p.md", "project\n"),
                ("README.md", "readme\n"),
                ("40-archive/old.md", "archived\n"),
            ],
            "initial",
        );

        let adapter = Git2SourceAdapter;
        let prefixes = vec!["10-ideas/".to_string(), "30-projects/".to_string()];
        let files = adapter
            .list_files(dir.path(), &prefixes, &oid.to_string())
            .unwrap();
        assert_eq!(files, vec!["10-ideas/a.md", "30-projects/p.md"]);
    }
}
