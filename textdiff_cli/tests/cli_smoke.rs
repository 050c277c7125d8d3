use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file_path(prefix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("textdiff-{prefix}-{nonce}.txt"))
}

fn write_pair(prefix: &str, a: &str, b: &str) -> (PathBuf, PathBuf) {
    let left = temp_file_path(&format!("{prefix}-a"));
    let right = temp_file_path(&format!("{prefix}-b"));
    fs::write(&left, a).expect("write a");
    fs::write(&right, b).expect("write b");
    (left, right)
}

#[test]
fn text_diff_cli_prints_markdown_report() {
    let (left, right) = write_pair("markdown", "testABC1", "testABB2");

    let output = Command::new(env!("CARGO_BIN_EXE_text-diff"))
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run text-diff");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Text Diff Report"));
    assert!(stdout.contains("Similarity: 0.7500"));
    assert!(stdout.contains("A: testAB{~C1~}"));
    assert!(stdout.ends_with('\n'));
}

#[test]
fn text_diff_cli_emits_json() {
    let (left, right) = write_pair("json", "hostname new\n", "hostname old\n");

    let output = Command::new(env!("CARGO_BIN_EXE_text-diff"))
        .arg("--json")
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run text-diff --json");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["has_changes"], true);
    assert!(json.get("operations").is_some());
    assert!(json.get("blocks").is_some());
}

#[test]
fn text_diff_cli_replays_supplied_script() {
    let (left, right) = write_pair("script", "testABC1", "testABB2");

    let output = Command::new(env!("CARGO_BIN_EXE_text-diff"))
        .args(["--format", "ops-json", "--script", "6=2X"])
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run text-diff --script");
    assert!(output.status.success());

    let ops: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(ops[1]["kind"], "substitute");
    assert_eq!(ops[1]["a"]["text"], "C1");
    assert_eq!(ops[1]["b"]["text"], "B2");
}

#[test]
fn text_diff_cli_rejects_inconsistent_script_without_output() {
    let (left, right) = write_pair("mismatch", "testABC1", "testABB2");

    let output = Command::new(env!("CARGO_BIN_EXE_text-diff"))
        .args(["--script", "5=2X"])
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run text-diff");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ReconstructionMismatch"));
}

#[test]
fn text_diff_cli_writes_html_with_config_file() {
    let (left, right) = write_pair("html", "<p>old text</p>", "<p>new text</p>");
    let config = temp_file_path("config");
    fs::write(&config, r#"{"context_threshold": 4, "context_width": 3}"#).expect("write config");
    let out = temp_file_path("report");

    let output = Command::new(env!("CARGO_BIN_EXE_text-diff"))
        .arg("--html")
        .arg("--strip-markup")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .arg(&left)
        .arg(&right)
        .output()
        .expect("run text-diff --html");

    assert!(output.status.success());
    let html = fs::read_to_string(&out).expect("read report");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("class='binfo'"));
    assert!(html.trim_end().ends_with("</html>"));
    assert!(html.ends_with('\n'));
    assert!(output.stdout.is_empty());
}

#[test]
fn text_diff_cli_fails_for_missing_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_text-diff"))
        .arg("/definitely/missing-a.txt")
        .arg("/definitely/missing-b.txt")
        .output()
        .expect("run text-diff");

    assert!(!output.status.success());
}

#[test]
fn replay_fixtures_cli_runs_successfully() {
    let output = Command::new(env!("CARGO_BIN_EXE_textdiff-replay-fixtures"))
        .output()
        .expect("run replay binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("replayed"));
    assert!(stdout.contains("fixture"));
}
