//! Repository acquisition: local paths are used in place, remote URLs are
//! cloned into a temporary directory that lives as long as the context.

pub mod github;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, ObjectType, RemoteCallbacks, Repository};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::RepositoryError;
use crate::utils::progress::progress_bar;

static SCP_LIKE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^/\\]").unwrap_or_else(|e| panic!("{e}"))
});

/// Where the repository lives for this run.
#[derive(Debug)]
pub struct RepoContext {
    pub root_path: PathBuf,
    /// Set when the repository was cloned from a URL
    pub remote_url: Option<String>,
    _temp_dir: Option<TempDir>,
}

/// True when `source` names a remote repository rather than a local path.
pub fn is_remote_source(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    ["https://", "http://", "ssh://", "git://", "file://"].iter().any(|scheme| lower.starts_with(scheme))
        || SCP_LIKE_URL.is_match(source)
}

/// Resolve `source` to a local working tree, cloning remote URLs.
pub fn fetch_repository(
    source: &str,
    ref_: Option<&str>,
    show_progress: bool,
) -> Result<RepoContext, RepositoryError> {
    if !is_remote_source(source) {
        return Ok(RepoContext {
            root_path: PathBuf::from(source),
            remote_url: None,
            _temp_dir: None,
        });
    }
    clone_repository(source, ref_, show_progress)
}

fn clone_repository(
    url: &str,
    ref_: Option<&str>,
    show_progress: bool,
) -> Result<RepoContext, RepositoryError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RepositoryError::EmptyUrl);
    }

    let temp_dir = TempDir::new().map_err(RepositoryError::TempDir)?;
    let dest = temp_dir.path().join(repo_name_from_url(url));

    let bar = progress_bar(0, "Cloning", show_progress);
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|stats| {
        bar.set_length(stats.total_objects() as u64);
        bar.set_position(stats.received_objects() as u64);
        true
    });
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    let result = builder.clone(url, &dest);
    bar.finish_and_clear();
    let repo = result.map_err(|source| RepositoryError::Clone { url: url.to_string(), source })?;
    info!(url, dest = %dest.display(), "Cloned repository");

    if let Some(reference) = ref_ {
        checkout_ref(&repo, reference)
            .map_err(|source| RepositoryError::Ref { reference: reference.to_string(), source })?;
    }

    Ok(RepoContext { root_path: dest, remote_url: Some(url.to_string()), _temp_dir: Some(temp_dir) })
}

/// Check out `reference` (branch, tag or commit) and detach HEAD at it.
///
/// Remote-tracking branches win over tags and local names of the same spelling.
fn checkout_ref(repo: &Repository, reference: &str) -> Result<(), git2::Error> {
    let object = repo
        .revparse_single(&format!("origin/{reference}"))
        .or_else(|_| repo.revparse_single(reference))?;
    let commit = object.peel(ObjectType::Commit)?;
    repo.checkout_tree(&commit, Some(CheckoutBuilder::new().force()))?;
    repo.set_head_detached(commit.id())?;
    debug!(reference, commit = %commit.id(), "Checked out ref");
    Ok(())
}

/// Last path segment of a repository URL without a `.git` suffix.
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

impl RepoContext {
    pub fn root(&self) -> &Path {
        &self.root_path
    }
}
