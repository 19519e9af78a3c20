//! Drives the `stepwise` binary end to end.

use std::path::Path;
use std::process::{Command, Output};

fn stepwise(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stepwise"))
        .args(args)
        .arg("--workspace")
        .arg(workspace)
        .env_remove("STEPWISE_CONFIG")
        .env_remove("STEPWISE_LOG")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

#[test]
fn session_lifecycle() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path();

    let out = stepwise(ws, &["start", "--process", "review", "--required", "doc.md"]);
    assert!(out.status.success());
    let id = stdout(&out);
    assert_eq!(id.len(), 8);
    assert!(ws.join(format!(".stepwise/sessions/{id}.yml")).exists());

    assert_eq!(stdout(&stepwise(ws, &["resume", &id])), "AWAITING_INPUT");
    std::fs::write(ws.join("doc.md"), "x").unwrap();
    assert_eq!(stdout(&stepwise(ws, &["resume", &id])), "RUNNING");

    assert_eq!(stdout(&stepwise(ws, &["step", &id, "draft"])), "RUNNING");
    assert_eq!(
        stdout(&stepwise(ws, &["checkpoint", &id])),
        "AWAITING_DECISION"
    );
    assert_eq!(stdout(&stepwise(ws, &["decide", &id, "ship it"])), "RUNNING");

    let status: serde_json::Value =
        serde_json::from_str(&stdout(&stepwise(ws, &["status", &id]))).unwrap();
    assert_eq!(status["history"], serde_json::json!(["draft", "decision:ship it"]));

    let out = stepwise(ws, &["complete", &id]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("handoff: "));
    assert_eq!(
        std::fs::read_dir(ws.join(".stepwise/handoffs")).unwrap().count(),
        1
    );
}

#[test]
fn failures_map_to_exit_codes() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path();

    let out = stepwise(ws, &["status", "nosuchid"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("session not found"));

    let id = stdout(&stepwise(ws, &["start", "--process", "p"]));
    assert_eq!(stepwise(ws, &["decide", &id, "x"]).status.code(), Some(8));
    assert_eq!(stepwise(ws, &["reset", &id, "missing"]).status.code(), Some(7));
    assert_eq!(stepwise(ws, &["plugin", "send", "ghost", "{}"]).status.code(), Some(3));
}

#[test]
fn init_and_validate() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("proj");
    let out = stepwise(tmp.path(), &["init", "--process", "onboarding", target.to_str().unwrap()]);
    assert!(out.status.success());

    let process = target.join("process/PROCESS.yml");
    let out = stepwise(tmp.path(), &["validate", process.to_str().unwrap(), "--recursive"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("phases: 1"));

    std::fs::remove_file(target.join("artifacts/briefing.md")).unwrap();
    let out = stepwise(tmp.path(), &["validate", process.to_str().unwrap(), "--recursive"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn config_from_workspace_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("stepwise.toml"),
        "[sessions]\ndir = \"records\"\n",
    )
    .unwrap();

    let out = stepwise(tmp.path(), &["config", "show"]);
    assert!(stdout(&out).contains("dir = \"records\""));

    let id = stdout(&stepwise(tmp.path(), &["start", "--process", "p"]));
    assert!(tmp.path().join(format!(".stepwise/records/{id}.yml")).exists());
}
