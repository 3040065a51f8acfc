//! Git working-tree access

use git2::{Status, StatusOptions};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::RepositoryError;
use crate::utils::normalize_path;

/// Index mode of a gitlink (submodule) entry.
const GITLINK_MODE: u32 = 0o160000;

/// A local Git working tree, optionally scoped to one of its subdirectories.
pub struct GitRepository {
    repo: git2::Repository,
    root: PathBuf,
    scope: Option<String>,
}

impl GitRepository {
    /// Open the repository containing `path`.
    ///
    /// When `path` is a subdirectory of the work tree, enumeration is limited to
    /// that subdirectory and paths are reported relative to it.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if !path.exists() {
            return Err(RepositoryError::NotFound { path: path.to_path_buf() });
        }
        if !path.is_dir() {
            return Err(RepositoryError::NotADirectory { path: path.to_path_buf() });
        }
        let root = path
            .canonicalize()
            .map_err(|_| RepositoryError::NotFound { path: path.to_path_buf() })?;

        let repo = git2::Repository::discover(&root).map_err(|source| {
            RepositoryError::NotARepository { path: path.to_path_buf(), source }
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| RepositoryError::Bare { path: path.to_path_buf() })?;
        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());

        let scope = root
            .strip_prefix(&workdir)
            .ok()
            .map(normalize_path)
            .filter(|s| !s.is_empty());
        debug!(root = %root.display(), workdir = %workdir.display(), ?scope, "Opened repository");

        Ok(Self { repo, root, scope })
    }

    /// Directory that relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display name of the repository (the root directory's name).
    pub fn name(&self) -> String {
        self.root.file_name().and_then(|n| n.to_str()).unwrap_or("repo").to_string()
    }

    /// Tracked files, plus untracked non-ignored files when `include_untracked`,
    /// sorted by relative path. Files missing from the work tree are skipped.
    pub fn list_files(&self, include_untracked: bool) -> Result<Vec<String>, RepositoryError> {
        let enumerate_err =
            |source| RepositoryError::Enumerate { path: self.root.clone(), source };

        let mut paths = BTreeSet::new();
        let index = self.repo.index().map_err(enumerate_err)?;
        for entry in index.iter() {
            if entry.mode == GITLINK_MODE {
                continue;
            }
            paths.insert(String::from_utf8_lossy(&entry.path).into_owned());
        }
        let tracked = paths.len();

        if include_untracked {
            let mut options = StatusOptions::new();
            options
                .include_untracked(true)
                .recurse_untracked_dirs(true)
                .include_ignored(false)
                .exclude_submodules(true);
            let statuses = self.repo.statuses(Some(&mut options)).map_err(enumerate_err)?;
            for status in statuses.iter() {
                if status.status().contains(Status::WT_NEW) {
                    if let Some(path) = status.path() {
                        paths.insert(path.to_string());
                    }
                }
            }
        }
        debug!(tracked, total = paths.len(), "Listed repository files");

        let prefix = self.scope.as_ref().map(|s| format!("{s}/"));
        let files = paths
            .into_iter()
            .filter_map(|path| match &prefix {
                Some(prefix) => path.strip_prefix(prefix.as_str()).map(str::to_string),
                None => Some(path),
            })
            .filter(|rel| self.root.join(rel).is_file())
            .collect();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, git2::Repository) {
        let dir = TempDir::new().expect("temp dir");
        let repo = git2::Repository::init(dir.path()).expect("git init");
        (dir, repo)
    }

    fn track(repo: &git2::Repository, rel: &str) {
        let mut index = repo.index().expect("index");
        index.add_path(Path::new(rel)).expect("add path");
        index.write().expect("write index");
    }

    #[test]
    fn lists_tracked_and_untracked_sorted() {
        let (dir, repo) = init_repo();
        fs::create_dir_all(dir.path().join("src")).expect("mkdir");
        fs::write(dir.path().join("b.txt"), "b").expect("write");
        fs::write(dir.path().join("src/a.rs"), "a").expect("write");
        fs::write(dir.path().join("a.txt"), "a").expect("write");
        track(&repo, "b.txt");

        let git = GitRepository::open(dir.path()).expect("open");
        assert_eq!(git.list_files(true).expect("list"), vec!["a.txt", "b.txt", "src/a.rs"]);
        assert_eq!(git.list_files(false).expect("list"), vec!["b.txt"]);
    }

    #[test]
    fn gitignored_untracked_files_are_skipped() {
        let (dir, _repo) = init_repo();
        fs::write(dir.path().join(".gitignore"), "*.tmp\n").expect("write");
        fs::write(dir.path().join("keep.txt"), "k").expect("write");
        fs::write(dir.path().join("drop.tmp"), "d").expect("write");

        let git = GitRepository::open(dir.path()).expect("open");
        assert_eq!(git.list_files(true).expect("list"), vec![".gitignore", "keep.txt"]);
    }

    #[test]
    fn deleted_tracked_files_are_skipped() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("gone.txt"), "g").expect("write");
        track(&repo, "gone.txt");
        fs::remove_file(dir.path().join("gone.txt")).expect("remove");

        let git = GitRepository::open(dir.path()).expect("open");
        assert!(git.list_files(true).expect("list").is_empty());
    }

    #[test]
    fn subdirectory_scopes_enumeration() {
        let (dir, _repo) = init_repo();
        fs::create_dir_all(dir.path().join("docs")).expect("mkdir");
        fs::write(dir.path().join("docs/guide.md"), "g").expect("write");
        fs::write(dir.path().join("top.txt"), "t").expect("write");

        let git = GitRepository::open(&dir.path().join("docs")).expect("open");
        assert_eq!(git.name(), "docs");
        assert_eq!(git.list_files(true).expect("list"), vec!["guide.md"]);
    }

    #[test]
    fn non_repository_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let err = GitRepository::open(dir.path()).err().expect("should fail");
        assert!(matches!(err, RepositoryError::NotARepository { .. }));
    }

    #[test]
    fn missing_path_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let err = GitRepository::open(&dir.path().join("nope")).err().expect("should fail");
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
