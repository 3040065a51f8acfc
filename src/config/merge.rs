//! CLI argument merging with config

use crate::domain::Config;
use std::path::PathBuf;

#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub source: Option<String>,
    pub ref_: Option<String>,
    pub output: Option<PathBuf>,
    /// Appended to the configured include globs
    pub include_globs: Vec<String>,
    /// Appended to the configured exclude globs
    pub exclude_globs: Vec<String>,
    pub default_excludes: Option<bool>,
    pub ignore_file: Option<PathBuf>,
    pub include_untracked: Option<bool>,
    pub max_file_bytes: Option<u64>,
    pub max_file_lines: Option<usize>,
    pub convert_html: Option<bool>,
    pub tree: Option<bool>,
    pub timestamp: Option<bool>,
    pub remote_metadata: Option<bool>,
}

pub fn merge_cli_with_config(mut base_config: Config, cli: CliOverrides) -> Config {
    if let Some(source) = cli.source {
        base_config.source = Some(source);
    }
    if let Some(ref_) = cli.ref_ {
        base_config.ref_ = Some(ref_);
    }
    if let Some(output) = cli.output {
        base_config.output = Some(output);
    }

    for glob in cli.include_globs {
        if !base_config.include_globs.contains(&glob) {
            base_config.include_globs.push(glob);
        }
    }
    for glob in cli.exclude_globs {
        if !base_config.exclude_globs.contains(&glob) {
            base_config.exclude_globs.push(glob);
        }
    }
    if let Some(default_excludes) = cli.default_excludes {
        base_config.default_excludes = default_excludes;
    }
    if let Some(ignore_file) = cli.ignore_file {
        base_config.ignore_file = Some(ignore_file);
    }
    if let Some(include_untracked) = cli.include_untracked {
        base_config.include_untracked = include_untracked;
    }

    if let Some(max_file_bytes) = cli.max_file_bytes {
        base_config.max_file_bytes = max_file_bytes;
    }
    if let Some(max_file_lines) = cli.max_file_lines {
        base_config.max_file_lines = Some(max_file_lines);
    }
    if let Some(convert_html) = cli.convert_html {
        base_config.convert_html = convert_html;
    }
    if let Some(tree) = cli.tree {
        base_config.tree = tree;
    }
    if let Some(timestamp) = cli.timestamp {
        base_config.timestamp = timestamp;
    }
    if let Some(remote_metadata) = cli.remote_metadata {
        base_config.remote_metadata = remote_metadata;
    }

    base_config
}
