//! Runs the `simple-press` binary against the fixture site.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_simple-press"))
        .args(args)
        .output()
        .expect("failed to run simple-press")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn build_generates_site() {
    let out = TempDir::new().unwrap();
    let output = run(&[
        "build",
        "--source",
        path_arg(&fixtures()),
        "--output",
        path_arg(out.path()),
    ]);
    assert!(
        output.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = stdout(&output);
    assert!(text.contains("Highlighter ready: base16-ocean.dark"));
    assert!(text.contains("Generated 5 pages (1 draft)"));
    assert!(out.path().join("articles/first-post/index.html").exists());
    assert!(out.path().join("assets/type/body.woff2").exists());
    assert!(out.path().join(".highlight-cache.json").exists());
}

#[test]
fn build_no_cache_skips_cache_file() {
    let out = TempDir::new().unwrap();
    let output = run(&[
        "build",
        "--no-cache",
        "--source",
        path_arg(&fixtures()),
        "--output",
        path_arg(out.path()),
    ]);
    assert!(output.status.success());
    assert!(!out.path().join(".highlight-cache.json").exists());
}

#[test]
fn check_reports_without_writing() {
    let out = TempDir::new().unwrap();
    let output = run(&[
        "check",
        "--source",
        path_arg(&fixtures()),
        "--output",
        path_arg(out.path()),
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("001 About this site"));
    assert!(text.contains("Content is valid"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn gen_config_prints_stock_config() {
    let output = run(&["gen-config"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[highlight]"));
    assert!(text.contains("unknown_language = \"plain\""));
}

#[test]
fn highlight_reads_file() {
    let tmp = TempDir::new().unwrap();
    let snippet = tmp.path().join("main.rs");
    std::fs::write(&snippet, "fn main() {}\n").unwrap();

    let output = run(&[
        "highlight",
        "--source",
        path_arg(&fixtures()),
        "--lang",
        "rust",
        path_arg(&snippet),
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains(r#"data-lang="rust""#));
    assert!(text.contains("<span style="));
}

#[test]
fn highlight_unconfigured_language_fails() {
    let tmp = TempDir::new().unwrap();
    let snippet = tmp.path().join("main.py");
    std::fs::write(&snippet, "print(1)\n").unwrap();

    let output = run(&[
        "highlight",
        "--source",
        path_arg(&fixtures()),
        "--lang",
        "python",
        path_arg(&snippet),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("python"));
}

#[test]
fn languages_marks_configured_entries() {
    let output = run(&["languages", "--source", path_arg(&fixtures())]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("  * Rust ["));
    assert!(text.contains("  > base16-ocean.dark"));
}
