//! Golden snapshot tests for export outputs.

use assert_cmd::Command;
use insta::{assert_json_snapshot, assert_snapshot};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn golden_context_document_is_stable() {
    let fixture = GoldenRepo::new();
    let out = TempDir::new().expect("temp out");
    let output = out.path().join("context.md");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-context"));
    cmd.arg(fixture.root()).arg("--output").arg(&output).args(["--no-timestamp", "--quiet"]);
    cmd.assert().success();

    let context = fs::read_to_string(&output).expect("context document");
    assert_snapshot!(context, @r"
    # Repository Context: golden

    Files: 2
    Estimated tokens: ~3

    ## Directory Structure

    ```text
    golden/
    ├── a.txt
    └── b.html
    ```

    # File: a.txt
    ```text
    hello
    ```

    # File: b.html
    ```markdown
    hi
    ```
    ");
}

#[test]
fn golden_report_files_are_stable() {
    let fixture = GoldenRepo::new();
    let out = TempDir::new().expect("temp out");
    let report_path = out.path().join("report.json");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-context"));
    cmd.arg(fixture.root()).arg("--report").arg(&report_path).args(["--no-timestamp", "--quiet"]);
    cmd.assert().success();

    let report: Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("report")).expect("parse");
    assert_json_snapshot!(report["files"], @r#"
    [
      {
        "id": "5891b5b522d5df08",
        "language": "text",
        "path": "a.txt",
        "size_bytes": 6,
        "status": "text",
        "tokens": 2
      },
      {
        "id": "8f434346648f6b96",
        "language": "markdown",
        "path": "b.html",
        "size_bytes": 10,
        "status": "converted",
        "tokens": 1
      }
    ]
    "#);
}

struct GoldenRepo {
    _dir: TempDir,
    root: PathBuf,
}

impl GoldenRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().join("golden");
        fs::create_dir_all(&root).expect("create root");
        let repo = git2::Repository::init(&root).expect("git init");

        let files: [(&str, &str); 2] = [("a.txt", "hello\n"), ("b.html", "<p>hi</p>\n")];
        let mut index = repo.index().expect("index");
        for (rel, content) in files {
            fs::write(root.join(rel), content).expect("write fixture file");
            index.add_path(Path::new(rel)).expect("add path");
        }
        index.write().expect("write index");

        Self { _dir: dir, root }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
