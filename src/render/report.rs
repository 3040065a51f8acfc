//! JSON run report

use serde_json::json;
use std::fs;
use std::path::Path;

use crate::domain::{FileEntry, ScanStats, REPORT_SCHEMA_VERSION};
use crate::error::OutputError;
use crate::utils::stable_hash;

/// Build the report value. `generated_at` is omitted when `None` so reports
/// stay byte-identical across runs.
pub fn build_report(
    repo_name: &str,
    root_path: &Path,
    stats: &ScanStats,
    entries: &[FileEntry],
    output_files: &[String],
    config: &serde_json::Value,
    generated_at: Option<&str>,
) -> serde_json::Value {
    let files: Vec<serde_json::Value> = entries
        .iter()
        .map(|entry| {
            let id = match entry.content.text() {
                Some(text) => stable_hash(text.as_bytes()),
                None => stable_hash(entry.relative_path.as_bytes()),
            };
            json!({
                "id": id,
                "path": entry.relative_path,
                "language": entry.language,
                "size_bytes": entry.size_bytes,
                "status": entry.content.status(),
                "tokens": entry.token_estimate,
            })
        })
        .collect();

    let mut report = json!({
        "schema_version": REPORT_SCHEMA_VERSION,
        "repository": {
            "name": repo_name,
            "root": root_path.display().to_string(),
        },
        "config": config,
        "stats": stats,
        "files": files,
        "output_files": output_files,
    });
    if let Some(ts) = generated_at {
        report["generated_at"] = json!(ts);
    }
    report
}

/// Serialize and write the report to `path`.
pub fn write_report(path: &Path, report: &serde_json::Value) -> Result<(), OutputError> {
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body + "\n")
        .map_err(|source| OutputError::Write { path: path.to_path_buf(), source })
}
