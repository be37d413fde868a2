//! Process-level checks for the hook binary against a temporary app group.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_hook(group_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_habit-widget-hook"))
        .args(args)
        .env("HABIT_WIDGET_GROUP_DIR", group_dir)
        .env("HABIT_WIDGET_DELIVERY_ENABLED", "0")
        .env_remove("HABIT_WIDGET_SOCKET")
        .output()
        .expect("run habit-widget-hook")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "hook failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_timeline_on_fresh_group_is_empty() {
    let temp = TempDir::new().unwrap();
    let json = stdout_json(&run_hook(temp.path(), &["timeline"]));

    assert_eq!(json["count_badge"], "0");
    assert_eq!(json["rows"].as_array().unwrap().len(), 0);
    assert_eq!(json["is_preview"], false);
}

#[test]
fn test_timeline_reads_published_store() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("shared-store.json"),
        r#"{"habits":"[{\"id\":\"habit-1\",\"name\":\"Make Bed\",\"completed\":true}]","habitCount":1}"#,
    )
    .unwrap();

    let json = stdout_json(&run_hook(temp.path(), &["timeline", "--size", "full"]));

    assert_eq!(json["count_badge"], "1");
    assert_eq!(json["rows"][0]["name"], "Make Bed");
    assert_eq!(json["rows"][0]["completed"], true);
}

#[test]
fn test_timeline_preview_ignores_corrupt_store() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("shared-store.json"), "garbage").unwrap();

    let json = stdout_json(&run_hook(temp.path(), &["timeline", "--preview"]));

    assert_eq!(json["count_badge"], "3");
    assert_eq!(json["is_preview"], true);
}

#[test]
fn test_complete_prints_intent_url() {
    let temp = TempDir::new().unwrap();
    let output = run_hook(temp.path(), &["complete", "--id", "habit 7"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "habitWidget://complete?id=habit%207"
    );
}

#[test]
fn test_complete_without_id_sends_legacy_intent() {
    let temp = TempDir::new().unwrap();
    let output = run_hook(temp.path(), &["complete"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "habitWidget://complete?id=none"
    );
}

#[test]
fn test_complete_with_blank_id_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_hook(temp.path(), &["complete", "--id", "  "]);

    assert!(!output.status.success());
    assert!(!temp.path().join("shared-store.json").exists());
}
