use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Plugins
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Root holding one directory per installed plugin id. Relative paths
    /// resolve against the workspace root.
    #[serde(default = "d_plugins_path")]
    pub path: PathBuf,

    /// Program used to run plugin code units (e.g. `sh`, `python3`).
    /// When unset the code unit is executed directly.
    #[serde(default)]
    pub interpreter: Option<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            path: d_plugins_path(),
            interpreter: None,
        }
    }
}

fn d_plugins_path() -> PathBuf {
    PathBuf::from(".stepwise/plugins")
}
