//! E2E link workflow tests: `tt check`, `tt link`, `tt unlink`, `tt suggest`,
//! `tt audit` against a task file in a temp project.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

fn tt_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tt"));
    cmd.current_dir(dir);
    cmd.env("TETHER_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd.env_remove("FORMAT");
    cmd.env_remove("RUST_BACKTRACE");
    cmd.env_remove("RUST_LIB_BACKTRACE");
    cmd
}

/// First JSON document on a stream; anything printed after it is ignored.
fn first_json(stream: &str) -> Value {
    let start = stream.find('{').expect("json on stream");
    serde_json::Deserializer::from_str(&stream[start..])
        .into_iter::<Value>()
        .next()
        .expect("a JSON value")
        .expect("valid JSON")
}

fn project(tasks: &Value) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".tether")).expect("mkdir");
    write_tasks(dir.path(), tasks);
    dir
}

fn write_config(dir: &Path, toml: &str) {
    std::fs::write(dir.join(".tether/config.toml"), toml).expect("write config");
}

fn write_tasks(dir: &Path, tasks: &Value) {
    std::fs::write(
        dir.join(".tether/tasks.json"),
        serde_json::to_string_pretty(tasks).expect("serialize"),
    )
    .expect("write tasks");
}

fn read_tasks(dir: &Path) -> Value {
    let raw = std::fs::read_to_string(dir.join(".tether/tasks.json")).expect("read tasks");
    serde_json::from_str(&raw).expect("valid JSON")
}

fn task<'a>(tasks: &'a Value, id: &str) -> &'a Value {
    tasks
        .as_array()
        .expect("array")
        .iter()
        .find(|t| t["id"] == id)
        .expect("task present")
}

fn dev_board() -> Value {
    json!([
        { "id": "a", "kind": "Dev", "title": "Schema" },
        { "id": "b", "kind": "Dev", "title": "API" },
        { "id": "c", "kind": "Dev", "title": "UI" },
        { "id": "d", "kind": "Design", "title": "Mockups" }
    ])
}

#[test]
fn link_records_both_sides_and_keeps_other_fields() {
    let dir = project(&dev_board());
    tt_cmd(dir.path())
        .args(["link", "a", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a blocks b"));

    let tasks = read_tasks(dir.path());
    assert_eq!(task(&tasks, "a")["blocks"], json!(["b"]));
    assert_eq!(task(&tasks, "b")["dependsOn"], json!(["a"]));
    assert_eq!(task(&tasks, "a")["title"], "Schema");
}

#[test]
fn link_twice_reports_already_linked() {
    let dir = project(&dev_board());
    tt_cmd(dir.path()).args(["link", "a", "b"]).assert().success();

    let output = tt_cmd(dir.path())
        .args(["link", "a", "b", "--json"])
        .output()
        .expect("link should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["outcome"], "already_linked");
    assert_eq!(task(&read_tasks(dir.path()), "a")["blocks"], json!(["b"]));
}

#[test]
fn closing_a_cycle_is_rejected_and_nothing_is_written() {
    let dir = project(&dev_board());
    tt_cmd(dir.path()).args(["link", "a", "b"]).assert().success();
    tt_cmd(dir.path()).args(["link", "b", "c"]).assert().success();
    let before = read_tasks(dir.path());

    tt_cmd(dir.path())
        .args(["link", "c", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));

    assert_eq!(read_tasks(dir.path()), before);
}

#[test]
fn policy_rejection_carries_reason_and_code() {
    let dir = project(&dev_board());
    let output = tt_cmd(dir.path())
        .args(["link", "a", "d", "--json"])
        .output()
        .expect("link should not crash");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json = first_json(&stderr);
    assert_eq!(json["error"]["error_code"], "E2002");
    assert!(
        json["error"]["message"]
            .as_str()
            .expect("message")
            .contains("neither same kind nor same epic/project")
    );
}

#[test]
fn different_domains_are_rejected_under_any_policy() {
    let dir = project(&json!([
        { "id": "a", "kind": "Dev", "domain": "web" },
        { "id": "b", "kind": "Dev", "domain": "ops" }
    ]));
    tt_cmd(dir.path())
        .args(["link", "a", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("different domains"));
}

#[test]
fn check_reports_verdict_and_exit_code() {
    let dir = project(&dev_board());
    tt_cmd(dir.path())
        .args(["check", "a", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a may block b"));

    tt_cmd(dir.path())
        .args(["check", "a", "a"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("self-link forbidden"));

    // check never writes.
    assert_eq!(read_tasks(dir.path()), dev_board());
}

#[test]
fn check_json_includes_neighbourhood() {
    let dir = project(&dev_board());
    tt_cmd(dir.path()).args(["link", "a", "b"]).assert().success();

    let output = tt_cmd(dir.path())
        .args(["check", "b", "c", "--json"])
        .output()
        .expect("check should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["ok"], true);
    assert_eq!(json["policy"], "same_epic_or_same_kind");
    assert_eq!(json["neighbourhood"][0]["id"], "b");
    assert_eq!(json["neighbourhood"][0]["blockers"], json!(["a"]));
    assert_eq!(json["neighbourhood"][0]["is_blocked"], true);
}

#[test]
fn unlink_removes_both_sides_even_when_policy_would_refuse() {
    let dir = project(&json!([
        { "id": "a", "kind": "Dev", "blocks": ["d"] },
        { "id": "d", "kind": "Design", "dependsOn": ["a"] }
    ]));
    tt_cmd(dir.path())
        .args(["unlink", "a", "d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no longer blocks"));

    let tasks = read_tasks(dir.path());
    assert_eq!(task(&tasks, "a")["blocks"], json!([]));
    assert_eq!(task(&tasks, "d")["dependsOn"], json!([]));
}

#[test]
fn unknown_task_is_not_found() {
    let dir = project(&dev_board());
    tt_cmd(dir.path())
        .args(["link", "a", "zzz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task not found: zzz"));
}

#[test]
fn missing_task_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    tt_cmd(dir.path())
        .args(["audit", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn file_flag_overrides_config() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("board.json");
    std::fs::write(&path, dev_board().to_string()).expect("write");

    tt_cmd(dir.path())
        .args(["--file", "board.json", "link", "a", "b"])
        .assert()
        .success();

    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(task(&raw, "b")["dependsOn"], json!(["a"]));
}

#[test]
fn malformed_config_is_reported_with_code() {
    let dir = project(&dev_board());
    write_config(dir.path(), "[linking\npolicy = 3");
    let before = read_tasks(dir.path());

    let output = tt_cmd(dir.path())
        .args(["link", "a", "b", "--json"])
        .output()
        .expect("link should not crash");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json = first_json(&stderr);
    assert_eq!(json["error"]["error_code"], "E1002");
    assert!(
        json["error"]["message"]
            .as_str()
            .expect("message")
            .contains("config.toml")
    );
    assert_eq!(read_tasks(dir.path()), before);
}

#[test]
fn malformed_config_text_mode_suggests_fix() {
    let dir = project(&dev_board());
    write_config(dir.path(), "[linking\npolicy = 3");

    tt_cmd(dir.path())
        .args(["audit", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"))
        .stderr(predicate::str::contains("suggestion: Fix the TOML syntax"));
}

#[test]
fn suggest_ranks_by_relevance() {
    let dir = project(&json!([
        { "id": "S", "domain": "web", "epicId": "E1", "kind": "Dev", "etiquettes": ["ui"] },
        { "id": "Y", "epicId": "E1", "kind": "Design" },
        { "id": "X", "domain": "web", "epicId": "E2", "kind": "Ops", "etiquettes": ["ui", "perf"] },
        { "id": "Z", "domain": "web", "epicId": "E1", "kind": "Dev", "archived": true }
    ]));
    write_config(
        dir.path(),
        "[linking]\npolicy = \"whitelist_cross_kind\"\ncross_kind_whitelist = [[\"Dev\", \"Ops\"]]\n",
    );

    let output = tt_cmd(dir.path())
        .args(["suggest", "S", "--json"])
        .output()
        .expect("suggest should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let ids: Vec<&str> = json["results"]
        .as_array()
        .expect("results")
        .iter()
        .map(|r| r["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["X", "Y"]);
    assert_eq!(json["results"][0]["score"], 13);
    assert_eq!(json["results"][1]["score"], 10);
}

#[test]
fn suggest_limit_flag_truncates() {
    let mut tasks = vec![json!({ "id": "S", "kind": "Dev" })];
    tasks.extend((0..20).map(|i| json!({ "id": format!("t-{i}"), "kind": "Dev" })));
    let dir = project(&Value::Array(tasks));

    let output = tt_cmd(dir.path())
        .args(["suggest", "S", "--json"])
        .output()
        .expect("suggest should not crash");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["count"], 8);

    let output = tt_cmd(dir.path())
        .args(["suggest", "S", "--limit", "3", "--json"])
        .output()
        .expect("suggest should not crash");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["count"], 3);
}

#[test]
fn audit_repair_mirrors_one_sided_edges() {
    let dir = project(&json!([
        { "id": "a", "kind": "Dev", "blocks": ["b", "b", "ghost"] },
        { "id": "b", "kind": "Dev" }
    ]));

    tt_cmd(dir.path())
        .args(["audit"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not recorded on b"));

    tt_cmd(dir.path())
        .args(["audit", "--repair"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no findings"));

    let tasks = read_tasks(dir.path());
    assert_eq!(task(&tasks, "a")["blocks"], json!(["b"]));
    assert_eq!(task(&tasks, "b")["dependsOn"], json!(["a"]));
}

#[test]
fn completions_mention_binary_name() {
    let dir = TempDir::new().expect("tempdir");
    tt_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_tt()"))
        .stdout(predicate::str::contains("suggest"));
}
