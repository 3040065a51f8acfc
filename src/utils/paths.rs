//! Path helpers

use std::path::Path;

/// Render a relative path with `/` separators regardless of platform.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// File extension with a leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
