//! Core domain types and models
//!
//! Defines FileEntry, FileContent, ScanStats, Config, etc.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Default name of the per-repository config file.
pub const CONFIG_FILE_NAME: &str = "repo-context.toml";

/// Document format detected from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Html,
    Plain,
}

impl DocumentFormat {
    pub fn detect(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            ".html" | ".htm" | ".xhtml" => DocumentFormat::Html,
            _ => DocumentFormat::Plain,
        }
    }
}

/// What the loader produced for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Decoded text, possibly converted to markdown.
    Text { text: String, format: DocumentFormat, converted: bool },

    /// Binary data; never rendered.
    Binary,

    /// File exceeded the size limit and was not read.
    TooLarge { limit: u64 },

    /// I/O failure while reading.
    Unreadable { reason: String },
}

impl FileContent {
    pub fn status(&self) -> &'static str {
        match self {
            FileContent::Text { converted: true, .. } => "converted",
            FileContent::Text { .. } => "text",
            FileContent::Binary => "binary",
            FileContent::TooLarge { .. } => "too_large",
            FileContent::Unreadable { .. } => "unreadable",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FileContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// One file as it appears in the context document.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,

    /// File size in bytes
    pub size_bytes: u64,

    /// File extension (with leading dot)
    pub extension: String,

    /// Fence language tag
    pub language: String,

    pub content: FileContent,

    /// Estimated tokens of the rendered content
    pub token_estimate: usize,
}

/// Statistics from enumeration and loading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files listed by git before filtering
    pub files_enumerated: usize,

    /// Files removed by include/exclude/ignore-file patterns
    pub files_excluded: usize,

    /// Files included in output
    pub files_included: usize,

    pub files_text: usize,
    pub files_binary: usize,
    pub files_too_large: usize,
    pub files_unreadable: usize,

    /// HTML files converted to markdown
    pub files_converted: usize,

    /// HTML files kept raw because conversion failed
    pub conversion_fallbacks: usize,

    /// Total bytes of included files on disk
    pub total_bytes: u64,

    /// Estimated total tokens in output
    pub total_tokens_estimated: usize,

    /// Processing time in seconds
    #[serde(default)]
    pub processing_time_seconds: f64,
}

impl ScanStats {
    pub fn record(&mut self, entry: &FileEntry) {
        self.files_included += 1;
        self.total_bytes += entry.size_bytes;
        self.total_tokens_estimated += entry.token_estimate;
        match &entry.content {
            FileContent::Text { converted, .. } => {
                self.files_text += 1;
                if *converted {
                    self.files_converted += 1;
                }
            }
            FileContent::Binary => self.files_binary += 1,
            FileContent::TooLarge { .. } => self.files_too_large += 1,
            FileContent::Unreadable { .. } => self.files_unreadable += 1,
        }
    }
}

/// Main configuration for repo-context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local path or remote URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Git ref (branch/tag) when cloning a remote source
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,

    /// Output file; stdout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default, rename = "include")]
    pub include_globs: Vec<String>,

    #[serde(default, rename = "exclude")]
    pub exclude_globs: Vec<String>,

    #[serde(default = "default_true")]
    pub default_excludes: bool,

    /// Gitignore-syntax pattern file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_file: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub include_untracked: bool,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Split the document into parts of at most this many lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_lines: Option<usize>,

    #[serde(default = "default_true")]
    pub convert_html: bool,

    #[serde(default = "default_true")]
    pub tree: bool,

    #[serde(default = "default_true")]
    pub timestamp: bool,

    /// Allow HTTP lookups of remote repository metadata
    #[serde(default = "default_true")]
    pub remote_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            ref_: None,
            output: None,
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
            default_excludes: true,
            ignore_file: None,
            include_untracked: true,
            max_file_bytes: default_max_file_bytes(),
            max_file_lines: None,
            convert_html: true,
            tree: true,
            timestamp: true,
            remote_metadata: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_file_bytes() -> u64 {
    1_000_000
}

pub fn default_exclude_globs() -> Vec<String> {
    [
        // Lock files
        "Cargo.lock",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "poetry.lock",
        "Pipfile.lock",
        "composer.lock",
        "go.sum",
        // Bundles
        "*.min.js",
        "*.min.css",
        "*.bundle.js",
        "*.map",
        // Local secrets
        ".env",
        ".env.*",
        // Misc
        ".DS_Store",
        "Thumbs.db",
        "*.pyc",
        "*.swp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Get the fence language tag from file extension or special filename.
pub fn get_language(extension: &str, filename: &str) -> String {
    let ext = extension.to_lowercase();
    let lang = match ext.as_str() {
        ".py" | ".pyi" | ".pyx" => "python",
        ".js" | ".jsx" | ".mjs" | ".cjs" => "javascript",
        ".ts" | ".tsx" => "typescript",
        ".go" => "go",
        ".java" => "java",
        ".kt" | ".kts" => "kotlin",
        ".rs" => "rust",
        ".c" | ".h" => "c",
        ".cpp" | ".hpp" | ".cc" | ".cxx" => "cpp",
        ".cs" => "csharp",
        ".rb" => "ruby",
        ".php" => "php",
        ".swift" => "swift",
        ".scala" => "scala",
        ".sh" | ".bash" => "bash",
        ".zsh" => "zsh",
        ".md" | ".markdown" => "markdown",
        ".rst" => "rst",
        ".txt" => "text",
        ".yaml" | ".yml" => "yaml",
        ".toml" => "toml",
        ".json" => "json",
        ".ini" | ".cfg" => "ini",
        ".html" | ".htm" | ".xhtml" => "html",
        ".xml" => "xml",
        ".css" => "css",
        ".scss" => "scss",
        ".vue" => "vue",
        ".svelte" => "svelte",
        ".sql" => "sql",
        ".graphql" => "graphql",
        ".proto" => "protobuf",
        _ => {
            let name = filename.to_lowercase();
            if name == "dockerfile" {
                return "dockerfile".to_string();
            }
            if name == "makefile" {
                return "makefile".to_string();
            }
            "text"
        }
    };
    lang.to_string()
}
