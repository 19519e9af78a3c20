//! End-to-end install and invocation of shell-script bundles.
#![cfg(unix)]

use std::fs;
use std::path::Path;

use serde_json::json;
use sw_domain::error::Error;
use sw_plugins::{PluginInvoker, PluginRegistry};

/// Write a bundle whose `run` function touches `marker` and echoes `reply`.
fn write_bundle(dir: &Path, id: &str, plugin_type: &str, reply: &str, marker: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("plugin.yml"),
        format!(
            "id: {id}\nname: {id}\nversion: 1.0.0\ntype: {plugin_type}\nentrypoint: plugin:run\npermissions:\n  network: false\n  fs: []\n  env: []\n"
        ),
    )
    .unwrap();
    fs::write(
        dir.join("plugin"),
        format!(
            r#"if [ "$1" = "--exports" ]; then echo '["run"]'; exit 0; fi
touch "{marker}"
read request
printf '{{"reply":"{reply}","request":%s}}' "$request"
"#,
            marker = marker.display()
        ),
    )
    .unwrap();
}

#[test]
fn installed_plugin_runs_with_payload() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("plugins");
    let marker = tmp.path().join("ran");
    write_bundle(&tmp.path().join("src"), "notify", "send", "ok", &marker);

    PluginRegistry::new(&root)
        .unwrap()
        .add_from_path(&tmp.path().join("src"))
        .unwrap();

    let invoker = PluginInvoker::with_process_loader(&root, Some("sh".into())).unwrap();
    let out = invoker.execute_send("notify", json!({"text": "hi"})).unwrap();
    assert_eq!(out["reply"], "ok");
    assert_eq!(
        out["request"],
        json!({"function": "run", "kind": "send", "payload": {"text": "hi"}})
    );
    assert!(marker.exists());
}

#[test]
fn type_mismatch_does_not_run_code() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("plugins");
    let marker = tmp.path().join("ran");
    write_bundle(&tmp.path().join("src"), "pdf", "export", "ok", &marker);
    PluginRegistry::new(&root)
        .unwrap()
        .add_from_path(&tmp.path().join("src"))
        .unwrap();

    let invoker = PluginInvoker::with_process_loader(&root, Some("sh".into())).unwrap();
    let err = invoker.execute_send("pdf", json!({})).unwrap_err();
    assert_eq!(err.kind(), "type_mismatch");
    assert!(!marker.exists());

    invoker
        .execute_export("pdf", Path::new("in.md"), None)
        .unwrap();
    assert!(marker.exists());
}

#[test]
fn reinstall_runs_new_code() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("plugins");
    let marker = tmp.path().join("ran");
    let registry = PluginRegistry::new(&root).unwrap();
    let invoker = PluginInvoker::with_process_loader(&root, Some("sh".into())).unwrap();

    write_bundle(&tmp.path().join("v1"), "gen", "generate", "first", &marker);
    registry.add_from_path(&tmp.path().join("v1")).unwrap();
    let out = invoker.execute_generate("gen", json!({})).unwrap();
    assert_eq!(out["reply"], "first");

    write_bundle(&tmp.path().join("v2"), "gen", "generate", "second", &marker);
    registry.add_from_path(&tmp.path().join("v2")).unwrap();
    let out = invoker.execute_generate("gen", json!({})).unwrap();
    assert_eq!(out["reply"], "second");
}

#[test]
fn removed_plugin_is_not_installed() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("plugins");
    let marker = tmp.path().join("ran");
    write_bundle(&tmp.path().join("src"), "hooky", "hook", "ok", &marker);
    let registry = PluginRegistry::new(&root).unwrap();
    registry.add_from_path(&tmp.path().join("src")).unwrap();
    assert!(registry.remove("hooky").unwrap());

    let invoker = PluginInvoker::with_process_loader(&root, Some("sh".into())).unwrap();
    assert!(matches!(
        invoker.execute_hook("hooky", json!({})),
        Err(Error::PluginNotFound(_))
    ));
}

#[test]
fn bundle_outside_the_root_never_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("plugins");
    let marker = tmp.path().join("ran");
    write_bundle(&tmp.path().join("outside"), "outside", "send", "ok", &marker);

    let invoker = PluginInvoker::with_process_loader(&root, Some("sh".into())).unwrap();
    assert!(matches!(
        invoker.execute_send("../outside", json!({})),
        Err(Error::PluginNotFound(_))
    ));
    assert!(!marker.exists());
}

#[test]
fn adding_the_installed_dir_again_keeps_it_runnable() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("plugins");
    let marker = tmp.path().join("ran");
    write_bundle(&tmp.path().join("src"), "notify", "send", "ok", &marker);
    let registry = PluginRegistry::new(&root).unwrap();
    registry.add_from_path(&tmp.path().join("src")).unwrap();

    registry.add_from_path(&root.join("notify")).unwrap();

    let invoker = PluginInvoker::with_process_loader(&root, Some("sh".into())).unwrap();
    let out = invoker.execute_send("notify", json!({})).unwrap();
    assert_eq!(out["reply"], "ok");
}
