//! Output rendering: the context document and the JSON report.

pub mod report;

pub use report::write_report;

use crate::domain::{FileContent, FileEntry};
use crate::utils::format_with_commas;

/// Everything the document header shows besides the files themselves.
#[derive(Debug, Clone, Default)]
pub struct HeaderInfo {
    pub repo_name: String,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub default_branch: Option<String>,
    /// Omitted for reproducible output
    pub generated_at: Option<String>,
    pub tree: Option<String>,
}

/// Header plus one rendered section per file, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDocument {
    header: String,
    sections: Vec<String>,
}

impl ContextDocument {
    pub fn assemble(info: &HeaderInfo, entries: &[FileEntry]) -> Self {
        let total_tokens: usize = entries.iter().map(|e| e.token_estimate).sum();
        Self {
            header: render_header(info, entries.len(), total_tokens),
            sections: entries.iter().map(render_section).collect(),
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// The whole document as one string.
    pub fn render(&self) -> String {
        let mut out = self.header.clone();
        for section in &self.sections {
            out.push('\n');
            out.push_str(section);
        }
        out
    }

    /// Split at section boundaries into parts of at most `max_lines` lines.
    ///
    /// A section longer than `max_lines` becomes a part of its own, and the
    /// header always shares a part with the first section.
    pub fn split(&self, max_lines: usize) -> Vec<String> {
        let max_lines = max_lines.max(1);
        let mut parts = Vec::new();
        let mut current = self.header.clone();
        let mut current_lines = line_count(&self.header);
        let mut header_only = true;

        for section in &self.sections {
            let section_lines = line_count(section) + 1;
            if !header_only && current_lines + section_lines > max_lines {
                parts.push(std::mem::take(&mut current));
                current_lines = 0;
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(section);
            current_lines += section_lines;
            header_only = false;
        }
        if !current.is_empty() {
            parts.push(current);
        }
        parts
    }
}

fn line_count(text: &str) -> usize {
    text.lines().count()
}

fn render_header(info: &HeaderInfo, file_count: usize, total_tokens: usize) -> String {
    let mut out = format!("# Repository Context: {}\n\n", info.repo_name);
    if let Some(description) = info.description.as_deref().filter(|d| !d.trim().is_empty()) {
        out.push_str(&format!("> {}\n\n", description.trim()));
    }
    if let Some(url) = &info.source_url {
        out.push_str(&format!("Source: {url}\n"));
    }
    if let Some(branch) = &info.default_branch {
        out.push_str(&format!("Default branch: {branch}\n"));
    }
    if let Some(generated_at) = &info.generated_at {
        out.push_str(&format!("Generated: {generated_at}\n"));
    }
    out.push_str(&format!("Files: {}\n", format_with_commas(file_count as u64)));
    out.push_str(&format!("Estimated tokens: ~{}\n", format_with_commas(total_tokens as u64)));

    if let Some(tree) = &info.tree {
        out.push_str("\n## Directory Structure\n\n");
        out.push_str(&fenced("text", tree));
    }
    out
}

/// `# File: <path>` followed by a fenced block with the content or a placeholder.
pub fn render_section(entry: &FileEntry) -> String {
    let block = match &entry.content {
        FileContent::Text { text, .. } => {
            fenced(&entry.language, text.trim_end_matches(['\n', '\r']))
        }
        other => fenced("text", &placeholder(other, entry.size_bytes)),
    };
    format!("# File: {}\n{}", entry.relative_path, block)
}

/// Placeholder text for content that is not rendered.
pub fn placeholder(content: &FileContent, size_bytes: u64) -> String {
    match content {
        FileContent::Binary => {
            format!("[binary file omitted: {} bytes]", format_with_commas(size_bytes))
        }
        FileContent::TooLarge { limit } => format!(
            "[file omitted: {} bytes exceeds limit of {} bytes]",
            format_with_commas(size_bytes),
            format_with_commas(*limit)
        ),
        FileContent::Unreadable { reason } => format!("[file unreadable: {reason}]"),
        FileContent::Text { text, .. } => text.clone(),
    }
}

/// Wrap `body` in a code fence longer than any backtick run it contains.
fn fenced(language: &str, body: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
    if body.is_empty() {
        format!("{fence}{language}\n{fence}\n")
    } else {
        format!("{fence}{language}\n{body}\n{fence}\n")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}
