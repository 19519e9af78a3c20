use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions & handoffs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Session records, one `<id>.yml` per session (under the state dir).
    #[serde(default = "d_sessions_dir")]
    pub dir: PathBuf,

    /// Handoff documents written on pause/complete (under the state dir).
    #[serde(default = "d_handoffs_dir")]
    pub handoffs_dir: PathBuf,

    /// Commit every session write to the enclosing git repository.
    /// Best-effort: failures are logged and never surface.
    #[serde(default)]
    pub auto_commit: bool,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            dir: d_sessions_dir(),
            handoffs_dir: d_handoffs_dir(),
            auto_commit: false,
        }
    }
}

fn d_sessions_dir() -> PathBuf {
    PathBuf::from("sessions")
}
fn d_handoffs_dir() -> PathBuf {
    PathBuf::from("handoffs")
}
