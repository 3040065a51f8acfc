//! Include/exclude filtering of relative paths
//!
//! Glob patterns containing `/` match the whole relative path (`*` stops at
//! separators, `**` crosses them). Patterns without `/` match any single path
//! component, so `*.log` drops `logs/debug.log` and `node_modules` drops the
//! whole directory. An optional ignore file uses gitignore syntax.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Debug)]
struct PatternSet {
    path_globs: GlobSet,
    component_globs: GlobSet,
    is_empty: bool,
}

impl PatternSet {
    fn build(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut path_builder = GlobSetBuilder::new();
        let mut component_builder = GlobSetBuilder::new();
        for pattern in patterns {
            let trimmed = pattern.trim().trim_start_matches("./").trim_end_matches('/');
            if trimmed.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(trimmed).literal_separator(true).build().map_err(
                |source| ConfigError::Glob { pattern: pattern.clone(), source },
            )?;
            if trimmed.contains('/') {
                path_builder.add(glob);
            } else {
                component_builder.add(glob);
            }
        }
        let build_err = |source| ConfigError::Glob { pattern: patterns.join(","), source };
        let path_globs = path_builder.build().map_err(build_err)?;
        let component_globs = component_builder.build().map_err(build_err)?;
        let is_empty = path_globs.is_empty() && component_globs.is_empty();
        Ok(Self { path_globs, component_globs, is_empty })
    }

    fn is_match(&self, relative_path: &str) -> bool {
        if self.path_globs.is_match(relative_path) {
            return true;
        }
        relative_path.split('/').any(|component| self.component_globs.is_match(component))
    }
}

/// Decides which enumerated paths reach the output.
#[derive(Debug)]
pub struct PathFilter {
    include: PatternSet,
    exclude: PatternSet,
    ignore_file: Option<(PathBuf, Gitignore)>,
}

impl PathFilter {
    pub fn new(
        include: &[String],
        exclude: &[String],
        ignore_file: Option<&Path>,
        root: &Path,
    ) -> Result<Self, ConfigError> {
        let ignore_file = match ignore_file {
            Some(path) => {
                let mut builder = GitignoreBuilder::new(root);
                if let Some(source) = builder.add(path) {
                    return Err(ConfigError::IgnoreFile { path: path.to_path_buf(), source });
                }
                let matcher = builder
                    .build()
                    .map_err(|source| ConfigError::IgnoreFile { path: path.to_path_buf(), source })?;
                debug!(path = %path.display(), patterns = matcher.num_ignores(), "Loaded ignore file");
                Some((root.to_path_buf(), matcher))
            }
            None => None,
        };

        Ok(Self {
            include: PatternSet::build(include)?,
            exclude: PatternSet::build(exclude)?,
            ignore_file,
        })
    }

    /// True when `relative_path` should be left out of the output.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        if !self.include.is_empty && !self.include.is_match(relative_path) {
            return true;
        }
        if self.exclude.is_match(relative_path) {
            return true;
        }
        if let Some((root, matcher)) = &self.ignore_file {
            let full = root.join(relative_path);
            if matcher.matched_path_or_any_parents(&full, false).is_ignore() {
                return true;
            }
        }
        false
    }

    /// Keep the paths that pass, preserving order. Returns the kept paths and
    /// the number dropped.
    pub fn apply(&self, paths: Vec<String>) -> (Vec<String>, usize) {
        let before = paths.len();
        let kept: Vec<String> = paths
            .into_iter()
            .filter(|p| {
                let excluded = self.is_excluded(p);
                if excluded {
                    debug!(path = p.as_str(), "Excluded by pattern");
                }
                !excluded
            })
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }
}
