mod plugins;
mod sessions;
mod workspace;

pub use plugins::*;
pub use sessions::*;
pub use workspace::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.workspace.state_dir.as_os_str().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "workspace.state_dir".into(),
                message: "state_dir must not be empty".into(),
            });
        }

        // Session and handoff directories live under the state dir.
        for (field, dir) in [
            ("sessions.dir", &self.sessions.dir),
            ("sessions.handoffs_dir", &self.sessions.handoffs_dir),
        ] {
            if dir.as_os_str().is_empty() {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Error,
                    field: field.into(),
                    message: "directory must not be empty".into(),
                });
            } else if dir.is_absolute() {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Warning,
                    field: field.into(),
                    message: "absolute path escapes the workspace state dir".into(),
                });
            }
        }

        if self.sessions.dir == self.sessions.handoffs_dir {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "sessions.handoffs_dir".into(),
                message: "handoffs must not share the sessions directory".into(),
            });
        }

        if self.plugins.path.as_os_str().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "plugins.path".into(),
                message: "plugin root must not be empty".into(),
            });
        }

        if let Some(interp) = &self.plugins.interpreter {
            if interp.trim().is_empty() {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Warning,
                    field: "plugins.interpreter".into(),
                    message: "blank interpreter is ignored; code units run directly".into(),
                });
            }
        }

        issues
    }
}
