//! Best-effort git commits of session records.
//!
//! Nothing here returns an error: a missing `git` binary, a directory
//! outside any repository, or a rejected commit are logged and ignored.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use sw_domain::trace::TraceEvent;

/// Commits individual files to the repository enclosing a base directory.
#[derive(Debug, Clone)]
pub struct GitCommitter {
    base_dir: PathBuf,
}

impl GitCommitter {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Nearest ancestor of the base dir (inclusive) containing `.git`.
    pub fn repo_root(&self) -> Option<PathBuf> {
        let start = self
            .base_dir
            .canonicalize()
            .unwrap_or_else(|_| self.base_dir.clone());
        start
            .ancestors()
            .find(|dir| dir.join(".git").exists())
            .map(Path::to_path_buf)
    }

    /// Stage and commit `file` with `message`. Never fails.
    pub fn commit(&self, file: &Path, message: &str) {
        let Some(root) = self.repo_root() else {
            tracing::debug!(path = %file.display(), "no git repository; skipping commit");
            return;
        };
        let file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());

        let committed = run_git(&root, &[OsStr::new("add"), file.as_os_str()])
            && run_git(
                &root,
                &[OsStr::new("commit"), OsStr::new("-m"), OsStr::new(message)],
            );

        TraceEvent::VcsCommit {
            repo_root: root.display().to_string(),
            path: file.display().to_string(),
            committed,
        }
        .emit();
    }
}

fn run_git(root: &Path, args: &[&OsStr]) -> bool {
    let output = Command::new("git").arg("-C").arg(root).args(args).output();
    match output {
        Ok(out) if out.status.success() => true,
        Ok(out) => {
            tracing::warn!(
                status = ?out.status.code(),
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "git command failed; continuing"
            );
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "git unavailable; continuing");
            false
        }
    }
}
