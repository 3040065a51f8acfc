//! Content loading
//!
//! Turns one enumerated path into a [`FileEntry`]. Nothing here returns an
//! error: read failures become `Unreadable`, binary data becomes `Binary`,
//! and failed conversions keep the raw text.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::convert::convert;
use crate::domain::{get_language, DocumentFormat, FileContent, FileEntry};
use crate::error::ReadError;
use crate::utils::paths::dotted_extension;
use crate::utils::{decode_bytes, estimate_tokens, Decoded};

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub max_file_bytes: u64,
    pub convert_html: bool,
}

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct Loaded {
    pub entry: FileEntry,
    /// Conversion was attempted and fell back to raw content
    pub conversion_fallback: bool,
}

/// Load `relative_path` under `root`.
pub fn load_entry(root: &Path, relative_path: &str, options: LoadOptions) -> Loaded {
    let path = root.join(relative_path);
    let extension = dotted_extension(&path);
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let mut language = get_language(&extension, filename);
    let format = DocumentFormat::detect(&extension);

    let (size_bytes, raw) = match read_limited(&path, options.max_file_bytes) {
        Ok(ReadOutcome::Bytes(bytes)) => (bytes.len() as u64, Some(bytes)),
        Ok(ReadOutcome::TooLarge(size)) => (size, None),
        Err(err) => {
            warn!("{err}");
            let content = FileContent::Unreadable { reason: unreadable_reason(&err) };
            return finish(path, relative_path, 0, extension, language, content, false);
        }
    };

    let Some(raw) = raw else {
        debug!(path = relative_path, size_bytes, "Skipping file over size limit");
        let content = FileContent::TooLarge { limit: options.max_file_bytes };
        return finish(path, relative_path, size_bytes, extension, language, content, false);
    };

    let (content, fallback) = match decode_bytes(&raw) {
        Decoded::Binary => {
            debug!(path = relative_path, "Binary file");
            (FileContent::Binary, false)
        }
        Decoded::Text { text, encoding } => {
            debug!(path = relative_path, encoding, "Decoded text");
            if format == DocumentFormat::Html && options.convert_html {
                match convert(&text, format) {
                    Ok(markdown) => {
                        language = "markdown".to_string();
                        (FileContent::Text { text: markdown, format, converted: true }, false)
                    }
                    Err(err) => {
                        warn!(path = relative_path, "HTML conversion failed, keeping raw content: {err}");
                        (FileContent::Text { text, format, converted: false }, true)
                    }
                }
            } else {
                (FileContent::Text { text, format, converted: false }, false)
            }
        }
    };

    finish(path, relative_path, size_bytes, extension, language, content, fallback)
}

enum ReadOutcome {
    Bytes(Vec<u8>),
    TooLarge(u64),
}

fn read_limited(path: &Path, max_bytes: u64) -> Result<ReadOutcome, ReadError> {
    let io_err = |source| ReadError::Io { path: path.to_path_buf(), source };
    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > max_bytes {
        return Ok(ReadOutcome::TooLarge(size));
    }
    fs::read(path).map(ReadOutcome::Bytes).map_err(io_err)
}

fn unreadable_reason(err: &ReadError) -> String {
    match err {
        ReadError::Io { source, .. } => source.to_string(),
    }
}

fn finish(
    path: std::path::PathBuf,
    relative_path: &str,
    size_bytes: u64,
    extension: String,
    language: String,
    content: FileContent,
    conversion_fallback: bool,
) -> Loaded {
    let token_estimate = content.text().map(estimate_tokens).unwrap_or(0);
    Loaded {
        entry: FileEntry {
            path,
            relative_path: relative_path.to_string(),
            size_bytes,
            extension,
            language,
            content,
            token_estimate,
        },
        conversion_fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn opts() -> LoadOptions {
        LoadOptions { max_file_bytes: 1_000, convert_html: true }
    }

    #[test]
    fn text_file_is_loaded_verbatim() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("a.txt"), "hello").expect("write");
        let loaded = load_entry(dir.path(), "a.txt", opts());
        assert_eq!(loaded.entry.content.text(), Some("hello"));
        assert_eq!(loaded.entry.language, "text");
        assert_eq!(loaded.entry.size_bytes, 5);
        assert_eq!(loaded.entry.token_estimate, 2);
    }

    #[test]
    fn html_is_converted_and_tagged_markdown() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("b.html"), "<p>hi</p>").expect("write");
        let loaded = load_entry(dir.path(), "b.html", opts());
        assert_eq!(loaded.entry.content.status(), "converted");
        assert_eq!(loaded.entry.content.text(), Some("hi"));
        assert_eq!(loaded.entry.language, "markdown");
        assert!(!loaded.conversion_fallback);
    }

    #[test]
    fn failed_conversion_keeps_raw_html() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("bad.html"), "<script>only()</script>").expect("write");
        let loaded = load_entry(dir.path(), "bad.html", opts());
        assert_eq!(loaded.entry.content.text(), Some("<script>only()</script>"));
        assert_eq!(loaded.entry.language, "html");
        assert!(loaded.conversion_fallback);
    }

    #[test]
    fn conversion_can_be_disabled() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("b.html"), "<p>hi</p>").expect("write");
        let options = LoadOptions { convert_html: false, ..opts() };
        let loaded = load_entry(dir.path(), "b.html", options);
        assert_eq!(loaded.entry.content.text(), Some("<p>hi</p>"));
        assert!(!loaded.conversion_fallback);
    }

    #[test]
    fn binary_and_oversized_files_get_markers() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("img.png"), b"\x89PNG\r\n\x1a\n\x00\x00").expect("write");
        fs::write(dir.path().join("big.txt"), "x".repeat(2_000)).expect("write");

        let binary = load_entry(dir.path(), "img.png", opts());
        assert_eq!(binary.entry.content, FileContent::Binary);
        assert_eq!(binary.entry.token_estimate, 0);

        let big = load_entry(dir.path(), "big.txt", opts());
        assert_eq!(big.entry.content, FileContent::TooLarge { limit: 1_000 });
        assert_eq!(big.entry.size_bytes, 2_000);
    }

    #[test]
    fn missing_file_is_unreadable_not_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let loaded = load_entry(dir.path(), "gone.txt", opts());
        assert!(matches!(loaded.entry.content, FileContent::Unreadable { .. }));
    }
}
