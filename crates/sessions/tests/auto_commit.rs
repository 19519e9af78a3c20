use std::path::Path;
use std::process::Command;

use sw_domain::process::ProcessDefinition;
use sw_sessions::SessionStore;

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(dir).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).to_string())
}

/// Initialise a repository with a local identity; `None` when git is absent.
fn init_repo(dir: &Path) -> Option<()> {
    git(dir, &["init", "-q"])?;
    git(dir, &["config", "user.email", "test@example.com"])?;
    git(dir, &["config", "user.name", "Test"])?;
    git(dir, &["config", "commit.gpgsign", "false"])?;
    Some(())
}

#[test]
fn create_and_update_are_committed() {
    let tmp = tempfile::tempdir().unwrap();
    if init_repo(tmp.path()).is_none() {
        eprintln!("git unavailable; skipping");
        return;
    }
    let store = SessionStore::new(&tmp.path().join(".stepwise/sessions"), true).unwrap();

    let mut session = store
        .create(&ProcessDefinition::new("demo", Vec::new()), Vec::new())
        .unwrap();
    session.mark_paused();
    store.update(&session).unwrap();

    let log = git(tmp.path(), &["log", "--format=%s"]).unwrap_or_default();
    let subjects: Vec<&str> = log.lines().collect();
    assert_eq!(
        subjects,
        vec![
            format!("[stepwise] session {} -> PAUSED", session.id),
            format!("[stepwise] session {} -> RUNNING", session.id),
        ]
    );

    let files = git(tmp.path(), &["ls-files"]).unwrap_or_default();
    assert!(files.contains(&format!(".stepwise/sessions/{}.yml", session.id)));
}

#[test]
fn disabled_auto_commit_leaves_history_empty() {
    let tmp = tempfile::tempdir().unwrap();
    if init_repo(tmp.path()).is_none() {
        eprintln!("git unavailable; skipping");
        return;
    }
    let store = SessionStore::new(&tmp.path().join("sessions"), false).unwrap();
    store
        .create(&ProcessDefinition::new("demo", Vec::new()), Vec::new())
        .unwrap();

    // No commits yet, so `git log` fails.
    assert!(git(tmp.path(), &["log", "--format=%s"]).is_none());
}

#[test]
fn outside_a_repository_persistence_still_succeeds() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SessionStore::new(&tmp.path().join("sessions"), true).unwrap();
    let session = store
        .create(&ProcessDefinition::new("demo", Vec::new()), Vec::new())
        .unwrap();
    assert_eq!(store.load(&session.id).unwrap(), session);
}
