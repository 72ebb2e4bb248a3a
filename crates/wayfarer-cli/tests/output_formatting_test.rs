//! Integration tests for output formatting
//!
//! These run the built binary with a cleared environment, so nothing here
//! needs PostgreSQL, Redis or Ollama.

use std::io::Write;
use std::process::{Command, Output};

fn wayfarer(args: &[&str], envs: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wayfarer"))
        .env_clear()
        .envs(envs.iter().copied())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_config_json_reports_sources() {
    let output = wayfarer(&["--json", "config"], &[("WAYFARER_FEED_PAGE_LIMIT", "20")]);
    assert!(output.status.success());

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");

    let rows = parsed["data"].as_array().expect("data should be an array");
    let limit = rows.iter().find(|r| r["key"] == "feed.page_limit").unwrap();
    assert_eq!(limit["value"], "20");
    assert_eq!(limit["source"], "Environment");

    let model = rows.iter().find(|r| r["key"] == "embedder.model").unwrap();
    assert_eq!(model["source"], "Default");
}

#[test]
fn test_dry_run_import_with_embeddings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": 1, "name": "Collins Chemist", "latitude": -37.8125, "longitude": 144.9612,
              "embedding": [0.0, 1.0]}},
            {{"id": 2, "name": "Night Pharmacy", "latitude": -37.8100, "longitude": 144.9600,
              "embedding": [1.0, 0.0]}}
        ]"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let output = wayfarer(
        &["--json", "locations", "import", path.as_str(), "--category", "pharmacy", "--dry-run"],
        &[("WAYFARER_EMBEDDER_DIM", "2")],
    );
    assert!(output.status.success());

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");
    assert!(parsed["message"].as_str().unwrap().contains("2 pharmacy location(s)"));
}

#[test]
fn test_unknown_category_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[]").unwrap();
    let path = file.path().to_string_lossy().to_string();

    let output =
        wayfarer(&["locations", "import", path.as_str(), "--category", "castle", "--dry-run"], &[]);
    assert!(!output.status.success());
}
