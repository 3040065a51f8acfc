//! Export pipeline: enumerate, load, convert, assemble, write.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{default_exclude_globs, Config, FileEntry, ScanStats};
use crate::error::OutputError;
use crate::fetch::github::{fetch_metadata, parse_github_url, RepoMetadata, GITHUB_API, TOKEN_ENV};
use crate::fetch::{fetch_repository, is_remote_source, RepoContext};
use crate::load::{load_entry, LoadOptions};
use crate::render::report::build_report;
use crate::render::{write_report, ContextDocument, HeaderInfo};
use crate::scan::{generate_tree, GitRepository, PathFilter};
use crate::utils::{format_with_commas, normalize_path};
use crate::utils::progress::progress_bar;

#[derive(Args)]
pub struct ExportArgs {
    /// Local path or Git URL of the repository (defaults to the current directory)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Write the document to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only include paths matching these globs (repeatable or comma-separated)
    #[arg(short, long = "include", value_name = "GLOB", value_delimiter = ',')]
    pub include: Vec<String>,

    /// Exclude paths matching these globs (repeatable or comma-separated)
    #[arg(short, long = "exclude", value_name = "GLOB", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// File with gitignore-style patterns to exclude
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// Do not apply the built-in excludes (lock files, minified bundles, ...)
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Only include files tracked in the git index
    #[arg(long)]
    pub tracked_only: bool,

    /// Render files larger than this (bytes) as a placeholder
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// Split the document into parts of at most N lines
    #[arg(long, value_name = "N")]
    pub max_file_lines: Option<usize>,

    /// Keep HTML files as raw HTML instead of converting to markdown
    #[arg(long)]
    pub no_convert: bool,

    /// Omit the directory structure from the header
    #[arg(long)]
    pub no_tree: bool,

    /// Omit the generation timestamp for reproducible output
    #[arg(long)]
    pub no_timestamp: bool,

    /// Print only the directory structure of the included files
    #[arg(long)]
    pub tree_only: bool,

    /// Write a JSON report of the run to FILE
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Branch or tag to check out when SOURCE is a URL
    #[arg(long = "ref", value_name = "REF")]
    pub ref_: Option<String>,

    /// Skip HTTP lookups of remote repository metadata
    #[arg(long)]
    pub offline: bool,

    /// Path to config file (defaults to repo-context.toml in the repository)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ExportArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            source: self.source.clone(),
            ref_: self.ref_.clone(),
            output: self.output.clone(),
            include_globs: self.include.clone(),
            exclude_globs: self.exclude.clone(),
            default_excludes: if self.no_default_excludes { Some(false) } else { None },
            ignore_file: self.ignore_file.clone(),
            include_untracked: if self.tracked_only { Some(false) } else { None },
            max_file_bytes: self.max_file_bytes,
            max_file_lines: self.max_file_lines,
            convert_html: if self.no_convert { Some(false) } else { None },
            tree: if self.no_tree { Some(false) } else { None },
            timestamp: if self.no_timestamp { Some(false) } else { None },
            remote_metadata: if self.offline { Some(false) } else { None },
        }
    }
}

pub fn run(args: ExportArgs, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    let cwd = std::env::current_dir()?;
    let config_anchor = match args.source.as_deref() {
        Some(source) if !is_remote_source(source) && Path::new(source).is_dir() => {
            Path::new(source).canonicalize().unwrap_or_else(|_| cwd.clone())
        }
        _ => cwd.clone(),
    };
    let file_config = load_config(&config_anchor, args.config.as_deref())?;
    let merged = merge_cli_with_config(file_config, args.overrides());
    if let (Some(_), Some(source)) = (merged.ref_.as_deref(), merged.source.as_deref()) {
        if !is_remote_source(source) {
            warn!("--ref only applies to remote sources; ignoring it for {source}");
        }
    }

    let source = merged.source.clone().unwrap_or_else(|| ".".to_string());
    let repo_ctx = fetch_repository(&source, merged.ref_.as_deref(), !quiet)?;
    let repo = GitRepository::open(repo_ctx.root())?;
    let repo_name = repo.name();
    info!(repo = %repo_name, root = %repo.root().display(), "Exporting repository");

    let mut excludes = merged.exclude_globs.clone();
    if merged.default_excludes {
        excludes.extend(default_exclude_globs());
    }
    let filter =
        PathFilter::new(&merged.include_globs, &excludes, merged.ignore_file.as_deref(), repo.root())?;

    let own_outputs =
        OwnOutputs::new(repo.root(), merged.output.as_deref(), args.report.as_deref());
    let mut stats = ScanStats::default();
    let listed: Vec<String> = repo
        .list_files(merged.include_untracked)?
        .into_iter()
        .filter(|p| {
            let own = own_outputs.contains(p);
            if own {
                debug!(path = p.as_str(), "Skipping output of this run");
            }
            !own
        })
        .collect();
    stats.files_enumerated = listed.len();
    let (paths, excluded) = filter.apply(listed);
    stats.files_excluded = excluded;
    info!(listed = stats.files_enumerated, excluded, included = paths.len(), "Enumerated files");

    if args.tree_only {
        let tree = generate_tree(&repo_name, &paths) + "\n";
        let outputs = write_output(merged.output.as_deref(), &[tree])?;
        if !quiet {
            print_outputs(&outputs);
        }
        return Ok(());
    }

    let entries = load_entries(repo.root(), &paths, &merged, &mut stats, quiet);

    let metadata = lookup_metadata(&repo_ctx, &merged);
    let header = HeaderInfo {
        repo_name: repo_name.clone(),
        description: metadata.as_ref().and_then(|m| m.description.clone()),
        source_url: repo_ctx.remote_url.clone(),
        default_branch: metadata.as_ref().and_then(|m| m.default_branch.clone()),
        generated_at: merged
            .timestamp
            .then(|| chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        tree: merged.tree.then(|| generate_tree(&repo_name, &paths)),
    };
    let document = ContextDocument::assemble(&header, &entries);
    // Stdout gets one stream; splitting only applies to file output.
    let parts = match (merged.max_file_lines, merged.output.as_ref()) {
        (Some(max_lines), Some(_)) => document.split(max_lines),
        _ => vec![document.render()],
    };
    info!(sections = document.section_count(), parts = parts.len(), "Assembled context document");

    let outputs = write_output(merged.output.as_deref(), &parts)?;
    stats.processing_time_seconds = start_time.elapsed().as_secs_f64();

    if let Some(report_path) = &args.report {
        let report = build_report(
            &repo_name,
            repo.root(),
            &stats,
            &entries,
            &outputs,
            &config_summary(&merged),
            header.generated_at.as_deref(),
        );
        write_report(report_path, &report)
            .with_context(|| format!("writing report {}", report_path.display()))?;
    }

    if !quiet {
        print_summary(repo.root(), &stats, &outputs, args.report.as_deref());
    }
    Ok(())
}

fn load_entries(
    root: &Path,
    paths: &[String],
    config: &Config,
    stats: &mut ScanStats,
    quiet: bool,
) -> Vec<FileEntry> {
    let options =
        LoadOptions { max_file_bytes: config.max_file_bytes, convert_html: config.convert_html };
    let bar = progress_bar(paths.len() as u64, "Processing", !quiet);
    let mut entries = Vec::with_capacity(paths.len());
    for relative_path in paths {
        let loaded = load_entry(root, relative_path, options);
        if loaded.conversion_fallback {
            stats.conversion_fallbacks += 1;
        }
        stats.record(&loaded.entry);
        entries.push(loaded.entry);
        bar.inc(1);
    }
    bar.finish_and_clear();
    entries
}

fn lookup_metadata(repo_ctx: &RepoContext, config: &Config) -> Option<RepoMetadata> {
    if !config.remote_metadata {
        return None;
    }
    let url = repo_ctx.remote_url.as_deref()?;
    let (owner, name) = parse_github_url(url)?;
    let token = std::env::var(TOKEN_ENV).ok();
    match fetch_metadata(GITHUB_API, &owner, &name, token.as_deref()) {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            warn!("Could not fetch metadata for {owner}/{name}: {err}");
            None
        }
    }
}

/// Write the document parts. With a file destination and several parts,
/// part `i` goes to `<stem>_<i>.<ext>`. Returns the written destinations.
fn write_output(output: Option<&Path>, parts: &[String]) -> Result<Vec<String>, OutputError> {
    let Some(path) = output else {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        for part in parts {
            lock.write_all(part.as_bytes()).map_err(OutputError::Stdout)?;
        }
        lock.flush().map_err(OutputError::Stdout)?;
        return Ok(vec!["<stdout>".to_string()]);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| OutputError::Write { path: parent.to_path_buf(), source })?;
    }

    let destinations: Vec<PathBuf> = if parts.len() == 1 {
        vec![path.to_path_buf()]
    } else {
        (0..parts.len()).map(|idx| part_path(path, idx)).collect()
    };
    for (dest, part) in destinations.iter().zip(parts) {
        fs::write(dest, part).map_err(|source| OutputError::Write { path: dest.clone(), source })?;
        info!(path = %dest.display(), "Context written");
    }
    Ok(destinations.iter().map(|p| p.display().to_string()).collect())
}

/// Files written by this run that live inside the repository, relative to its
/// root. Split parts are matched as `<stem>_<digits>.<ext>` next to the output.
#[derive(Debug, Default)]
struct OwnOutputs {
    files: Vec<String>,
    parts: Option<(String, String)>,
}

impl OwnOutputs {
    fn new(root: &Path, output: Option<&Path>, report: Option<&Path>) -> Self {
        let mut own = OwnOutputs::default();
        if let Some(rel) = output.and_then(|p| relative_to_root(root, p)) {
            let (stem, ext) = match rel.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') && !ext.contains('/') => {
                    (stem.to_string(), format!(".{ext}"))
                }
                _ => (rel.clone(), String::new()),
            };
            own.parts = Some((format!("{stem}_"), ext));
            own.files.push(rel);
        }
        own.files.extend(report.and_then(|p| relative_to_root(root, p)));
        own
    }

    fn contains(&self, relative_path: &str) -> bool {
        if self.files.iter().any(|f| f == relative_path) {
            return true;
        }
        let Some((prefix, suffix)) = &self.parts else {
            return false;
        };
        relative_path
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            .is_some_and(|idx| !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// `path` relative to `root`, resolving symlinks in its parent directory.
/// `None` when the path lies outside `root` or its parent does not exist.
fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    let parent = absolute.parent()?.canonicalize().ok()?;
    let resolved = parent.join(absolute.file_name()?);
    resolved.strip_prefix(root).ok().map(normalize_path)
}

fn part_path(path: &Path, idx: usize) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("context");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{idx}.{ext}"),
        None => format!("{stem}_{idx}"),
    };
    path.with_file_name(name)
}

fn config_summary(config: &Config) -> serde_json::Value {
    json!({
        "source":            config.source,
        "ref":               config.ref_,
        "include":           config.include_globs,
        "exclude":           config.exclude_globs,
        "default_excludes":  config.default_excludes,
        "ignore_file":       config.ignore_file.as_ref().map(|p| p.display().to_string()),
        "include_untracked": config.include_untracked,
        "max_file_bytes":    config.max_file_bytes,
        "max_file_lines":    config.max_file_lines,
        "convert_html":      config.convert_html,
        "tree":              config.tree,
        "timestamp":         config.timestamp,
    })
}

fn print_summary(root: &Path, stats: &ScanStats, outputs: &[String], report: Option<&Path>) {
    eprintln!();
    eprintln!("{}", style("Export complete!").green().bold().for_stderr());
    eprintln!();
    eprintln!("Statistics:");
    eprintln!("  Repository:      {}", root.display());
    eprintln!("  Files listed:    {}", stats.files_enumerated);
    if stats.files_excluded > 0 {
        eprintln!("  Files excluded:  {}", stats.files_excluded);
    }
    eprintln!("  Files included:  {}", stats.files_included);
    let any_placeholder =
        stats.files_binary > 0 || stats.files_too_large > 0 || stats.files_unreadable > 0;
    if any_placeholder {
        eprintln!("  Placeholders:");
        if stats.files_binary > 0 {
            eprintln!("    binary:      {}", stats.files_binary);
        }
        if stats.files_too_large > 0 {
            eprintln!("    size limit:  {}", stats.files_too_large);
        }
        if stats.files_unreadable > 0 {
            eprintln!("    unreadable:  {}", style(stats.files_unreadable).yellow().for_stderr());
        }
    }
    if stats.files_converted > 0 || stats.conversion_fallbacks > 0 {
        eprintln!(
            "  HTML converted:  {} ({} kept raw)",
            stats.files_converted, stats.conversion_fallbacks
        );
    }
    eprintln!("  Total bytes:     {}", format_with_commas(stats.total_bytes));
    eprintln!("  Total tokens:    ~{}", format_with_commas(stats.total_tokens_estimated as u64));
    eprintln!("  Processing time: {:.2}s", stats.processing_time_seconds);

    let mut all_outputs: Vec<String> = outputs.to_vec();
    if let Some(report) = report {
        all_outputs.push(report.display().to_string());
    }
    print_outputs(&all_outputs);
}

fn print_outputs(outputs: &[String]) {
    eprintln!();
    eprintln!("Output:");
    for out in outputs {
        eprintln!("  {}", style(out).cyan().for_stderr());
    }
}
