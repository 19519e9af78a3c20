use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Config;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Workspace
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory (relative to the workspace root) holding all tool state.
    #[serde(default = "d_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            state_dir: d_state_dir(),
        }
    }
}

fn d_state_dir() -> PathBuf {
    PathBuf::from(".stepwise")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolved paths
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Concrete directories for one workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub workspace: PathBuf,
    pub sessions: PathBuf,
    pub handoffs: PathBuf,
    pub plugins: PathBuf,
}

impl Paths {
    pub fn resolve(workspace: &Path, config: &Config) -> Self {
        let state = workspace.join(&config.workspace.state_dir);
        let plugins = if config.plugins.path.is_absolute() {
            config.plugins.path.clone()
        } else {
            workspace.join(&config.plugins.path)
        };
        Self {
            workspace: workspace.to_path_buf(),
            sessions: state.join(&config.sessions.dir),
            handoffs: state.join(&config.sessions.handoffs_dir),
            plugins,
        }
    }
}
