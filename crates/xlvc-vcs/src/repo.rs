//! Narrow stage/commit adapter over a `git2::Repository` working tree.
//!
//! Only what the conversion pipeline needs is exposed: stage paths, commit
//! staged changes, and check whether a directory is a repository and
//! whether its working tree is clean. Push, pull, and branch management are
//! not part of this contract.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{IndexAddOption, Repository, Signature};

use xlvc_model::error::{Error, Result};

/// A VCS working tree the pipeline stages and commits into.
pub struct VcsAdapter {
    repo: Repository,
}

impl VcsAdapter {
    /// Open an existing repository rooted at or above `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| Error::VCSError(e.to_string()))?;
        Ok(Self { repo })
    }

    /// True if `path` is inside a git working tree.
    pub fn is_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    /// True if the working tree has no staged or unstaged changes.
    pub fn is_clean(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| Error::VCSError(e.to_string()))?;
        Ok(statuses.is_empty())
    }

    /// Stage the given paths (relative to the working tree root). An empty
    /// slice stages the whole working tree.
    ///
    /// Non-empty paths go through `update_all` rather than `add_all`: a
    /// deletion job already removed its chunk directory from disk before
    /// staging, and only `update_all` picks up a path that no longer exists
    /// as a staged removal -- `add_all` silently ignores it.
    pub fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        let mut index = self.repo.index().map_err(|e| Error::VCSError(e.to_string()))?;
        if paths.is_empty() {
            index
                .add_all(["."].iter(), IndexAddOption::DEFAULT, None)
                .map_err(|e| Error::VCSError(e.to_string()))?;
        } else {
            index
                .update_all(paths.iter(), None)
                .map_err(|e| Error::VCSError(e.to_string()))?;
            index
                .add_all(paths.iter(), IndexAddOption::DEFAULT, None)
                .map_err(|e| Error::VCSError(e.to_string()))?;
        }
        index.write().map_err(|e| Error::VCSError(e.to_string()))?;
        Ok(())
    }

    /// Commit whatever is currently staged. A no-op (returns `Ok(None)`) if
    /// the working tree is clean after staging.
    pub fn commit(
        &self,
        message: &str,
        author_name: &str,
        author_email: &str,
        time: DateTime<Utc>,
    ) -> Result<Option<git2::Oid>> {
        if self.is_clean()? {
            return Ok(None);
        }

        let mut index = self.repo.index().map_err(|e| Error::VCSError(e.to_string()))?;
        let tree_oid = index.write_tree().map_err(|e| Error::VCSError(e.to_string()))?;
        let tree = self.repo.find_tree(tree_oid).map_err(|e| Error::VCSError(e.to_string()))?;

        let git_time = git2::Time::new(time.timestamp(), 0);
        let signature = Signature::new(author_name, author_email, &git_time)
            .map_err(|e| Error::VCSError(e.to_string()))?;

        let parents = match self.repo.head().and_then(|h| h.peel_to_commit()) {
            Ok(commit) => vec![commit],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .map_err(|e| Error::VCSError(e.to_string()))?;
        Ok(Some(oid))
    }

    /// The repository's current branch name, if HEAD points at a branch.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn init_repo() -> (tempfile::TempDir, VcsAdapter) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        let adapter = VcsAdapter::open(dir.path()).unwrap();
        (dir, adapter)
    }

    #[test]
    fn test_is_repo_detects_git_directory() {
        let (dir, _adapter) = init_repo();
        assert!(VcsAdapter::is_repo(dir.path()));
    }

    #[test]
    fn test_is_repo_false_for_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!VcsAdapter::is_repo(dir.path()));
    }

    #[test]
    fn test_commit_is_noop_on_clean_tree() {
        let (_dir, adapter) = init_repo();
        adapter.stage(&[]).unwrap();
        let result = adapter.commit("nothing to do", "Test", "test@example.com", Utc::now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_stage_and_commit_creates_commit() {
        let (dir, adapter) = init_repo();
        fs::write(dir.path().join("Budget.xlsx_chunks.json"), b"{}").unwrap();
        adapter.stage(&[]).unwrap();
        let result = adapter.commit("add: Budget.xlsx", "Test", "test@example.com", Utc::now()).unwrap();
        assert!(result.is_some());
        assert!(adapter.is_clean().unwrap());
    }

    #[test]
    fn test_stage_with_explicit_path_ignores_other_untracked_files() {
        let (dir, adapter) = init_repo();
        fs::write(dir.path().join("Budget.xlsx_chunks.json"), b"{}").unwrap();
        fs::write(dir.path().join("Other.xlsx_chunks.json"), b"{}").unwrap();

        adapter.stage(&[PathBuf::from("Budget.xlsx_chunks.json")]).unwrap();

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = adapter.repo.statuses(Some(&mut opts)).unwrap();
        let other = statuses
            .iter()
            .find(|s| s.path() == Some("Other.xlsx_chunks.json"))
            .unwrap();
        assert!(other.status().contains(git2::Status::WT_NEW));
    }

    #[test]
    fn test_stage_with_explicit_path_picks_up_deletion() {
        let (dir, adapter) = init_repo();
        let file = dir.path().join("Budget.xlsx_chunks.json");
        fs::write(&file, b"{}").unwrap();
        adapter.stage(&[PathBuf::from("Budget.xlsx_chunks.json")]).unwrap();
        adapter.commit("add: Budget.xlsx", "Test", "test@example.com", Utc::now()).unwrap();

        fs::remove_file(&file).unwrap();
        adapter.stage(&[PathBuf::from("Budget.xlsx_chunks.json")]).unwrap();
        let result = adapter.commit("delete: Budget.xlsx", "Test", "test@example.com", Utc::now()).unwrap();
        assert!(result.is_some());
        assert!(adapter.is_clean().unwrap());
    }
}
