//! `init` and `validate`.

use std::path::Path;

use sw_domain::process::{scaffold, validate_process_file};

/// Scaffold a process layout under `target`.
pub fn init(process_name: &str, target: &Path) -> anyhow::Result<String> {
    let written = scaffold(process_name, target)?;
    for path in &written {
        tracing::info!(path = %path.display(), "scaffolded");
    }
    Ok(format!("init done in {} ({} file(s) written)", target.display(), written.len()))
}

/// Validate a process file; the error side carries the failure message.
pub fn validate(path: &Path, recursive: bool) -> std::result::Result<String, String> {
    let report = validate_process_file(path, recursive);
    if report.is_valid() {
        Ok(format!("PROCESS.yml ok | phases: {}", report.phases))
    } else {
        Err(format!("validation failed: {}", report.errors.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_domain::process::PROCESS_FILE;

    #[test]
    fn init_then_validate_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let out = init("onboarding", tmp.path()).unwrap();
        assert!(out.contains("2 file(s) written"));

        let msg = validate(&tmp.path().join(PROCESS_FILE), true).unwrap();
        assert_eq!(msg, "PROCESS.yml ok | phases: 1");

        // A second init keeps existing files.
        let out = init("other", tmp.path()).unwrap();
        assert!(out.contains("0 file(s) written"));
    }

    #[test]
    fn validate_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = validate(&tmp.path().join("nope.yml"), false).unwrap_err();
        assert!(err.starts_with("validation failed: "));
        assert!(err.contains("not found"));
    }
}
